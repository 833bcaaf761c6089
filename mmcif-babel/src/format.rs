//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations
//! must implement. The trait provides a uniform interface for parsing and
//! serializing documents.

use crate::error::FormatError;
use mmcif_parser::cif::Document;

/// Trait for document formats
///
/// Implementors provide conversion between a wire representation and the
/// shared [`Document`] model. Formats can support parsing, serialization,
/// or both; a format that carries settings (e.g. the CIF serializer's
/// write options) holds them as struct fields.
pub trait Format: Send + Sync + std::fmt::Debug {
    /// The name of this format (e.g., "cif", "mmjson", "pdbml")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// Whether this format supports parsing (source → Document)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Document → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a Document
    ///
    /// Default implementation returns NotSupported error.
    /// Formats that support parsing should override this method.
    fn parse(&self, _source: &str) -> Result<Document, FormatError> {
        Err(FormatError::NotSupported(format!(
            "format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a Document into source text
    ///
    /// Default implementation returns NotSupported error.
    /// Formats that support serialization should override this method.
    fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "format '{}' does not support serialization",
            self.name()
        )))
    }
}
