//! Format registry for format discovery and selection
//!
//! This module provides a centralized registry for all available formats.
//! Formats can be registered and retrieved by name.

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::cif::CifFormat;
use crate::formats::mmjson::MmjsonFormat;
use crate::formats::pdbml::PdbmlFormat;
use std::collections::HashMap;

/// Registry of document formats
///
/// Provides a centralized registry for all available formats.
/// Formats can be registered and retrieved by name.
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Create a registry with the built-in formats (cif, mmjson, pdbml)
    /// registered under their default settings.
    pub fn with_defaults() -> Self {
        let mut registry = FormatRegistry::new();
        registry.register(CifFormat::default());
        registry.register(MmjsonFormat);
        registry.register(PdbmlFormat);
        registry
    }

    /// Register a format
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    /// Get a format by name
    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_all_formats() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.list_formats(), vec!["cif", "mmjson", "pdbml"]);
        assert!(registry.has("cif"));
        assert!(!registry.has("yaml"));
    }

    #[test]
    fn direction_support_is_declared() {
        let registry = FormatRegistry::with_defaults();
        assert!(registry.get("cif").unwrap().supports_parsing());
        assert!(registry.get("cif").unwrap().supports_serialization());
        assert!(!registry.get("mmjson").unwrap().supports_parsing());
        assert!(!registry.get("pdbml").unwrap().supports_serialization());
    }

    #[test]
    fn unknown_format_is_an_error() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            registry.get("toml").unwrap_err(),
            FormatError::FormatNotFound("toml".into())
        );
    }
}
