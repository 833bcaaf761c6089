//! PDBML XML format: alternate ingestion front end.

pub mod parser;

pub use parser::{parse, PdbmlError};

use crate::error::FormatError;
use crate::format::Format;
use mmcif_parser::cif::Document;

/// The PDBML XML format. Parsing only.
#[derive(Debug, Clone, Copy)]
pub struct PdbmlFormat;

impl Format for PdbmlFormat {
    fn name(&self) -> &str {
        "pdbml"
    }

    fn description(&self) -> &str {
        "PDBML (PDB XML dialect)"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parser::parse(source).map_err(|e| FormatError::Parse(e.to_string()))
    }
}
