//! # mmcif-parser
//!
//! A parser for the CIF/mmCIF format.
//!
//! CIF (Crystallographic Information File) is a line-oriented, tag-based
//! text format used for molecular structure records. This crate implements
//! the core codec engine: a quote- and comment-aware line tokenizer, the
//! directive state machine that builds the hierarchical data model, the
//! loop (tabular block) column router, dictionary-driven scalar typing,
//! and the type normalizer.
//!
//! Serialization back to CIF text and to mmJSON, along with the PDBML XML
//! front end, live in the companion `mmcif-babel` crate. This crate is a
//! pure library: nothing here assumes a shell environment or performs I/O
//! beyond what the caller hands in.
//!
//! The top-level entry point is [`cif::parse`]:
//!
//! ```ignore
//! let doc = mmcif_parser::cif::parse("data_demo\n_cell.length_a 50.0\n")?;
//! let block = doc.block("demo").unwrap();
//! ```

pub mod cif;
