//! Multi-format interoperability for CIF documents
//!
//!     This crate converts between the shared CIF data model
//!     (`mmcif_parser::cif::Document`) and its wire forms: CIF text,
//!     mmJSON, and the PDBML XML dialect.
//!
//! Architecture
//!
//!     - Format trait: uniform interface for all formats (parsing and/or
//!       serialization)
//!     - FormatRegistry: centralized discovery and selection of formats
//!     - Format implementations: one module per format
//!
//!     This is a pure lib: it powers mmcif-cli but is shell agnostic — no
//!     std printing, no env vars, no filesystem assumptions.
//!
//!     The file structure:
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery/selection
//!     ├── formats
//!     │   ├── cif                 # text serializer + streaming emitter
//!     │   ├── mmjson              # JSON value + streaming emitter
//!     │   └── pdbml               # XML ingestor
//!     └── lib.rs
//!
//! Streaming
//!
//!     The CIF and mmJSON emitters have incremental variants writing to an
//!     injected `tokio::io::AsyncWrite` sink. Each chunk write is awaited
//!     before the next chunk is produced, so a backpressured sink is never
//!     more than one chunk behind.

pub mod error;
pub mod format;
pub mod formats;
pub mod registry;

pub use error::FormatError;
pub use format::Format;
pub use registry::FormatRegistry;
