//! mmJSON format: structured JSON output for CIF documents.

pub mod serializer;

pub use serializer::{stream, to_value};

use crate::error::FormatError;
use crate::format::Format;
use mmcif_parser::cif::Document;

/// The mmJSON output format. Serialization only.
#[derive(Debug, Clone, Copy)]
pub struct MmjsonFormat;

impl Format for MmjsonFormat {
    fn name(&self) -> &str {
        "mmjson"
    }

    fn description(&self) -> &str {
        "mmJSON structured output"
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serde_json::to_string(&serializer::to_value(doc))
            .map_err(|e| FormatError::Serialize(e.to_string()))
    }
}
