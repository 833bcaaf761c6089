//! CIF text format: parsing via `mmcif-parser`, serialization here.

pub mod serializer;

pub use serializer::{serialize, stream, WriteSettings};

use crate::error::FormatError;
use crate::format::Format;
use mmcif_parser::cif::Document;

/// The CIF text format. Serialization honors the carried
/// [`WriteSettings`]; parsing delegates to the core engine.
#[derive(Debug, Clone, Default)]
pub struct CifFormat {
    pub settings: WriteSettings,
}

impl CifFormat {
    pub fn new(settings: WriteSettings) -> Self {
        CifFormat { settings }
    }
}

impl Format for CifFormat {
    fn name(&self) -> &str {
        "cif"
    }

    fn description(&self) -> &str {
        "CIF/mmCIF text"
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        mmcif_parser::cif::parse(source).map_err(|e| FormatError::Parse(e.to_string()))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        Ok(serializer::serialize(doc, &self.settings))
    }
}
