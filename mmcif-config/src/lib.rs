//! Shared configuration loader for the mmcif toolchain.
//!
//! `defaults/mmcif.default.toml` is embedded into every binary so that
//! docs and runtime behavior stay in sync. Applications layer
//! user-specific files on top of those defaults via [`Loader`] before
//! deserializing into [`MmcifConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use mmcif_babel::formats::cif::WriteSettings;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/mmcif.default.toml");

/// Top-level configuration consumed by mmcif applications.
#[derive(Debug, Clone, Deserialize)]
pub struct MmcifConfig {
    pub write: WriteConfig,
    pub dictionary: DictionaryConfig,
}

/// Mirrors the knobs exposed by the CIF serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteConfig {
    pub omit_hash: bool,
    pub force_loop: bool,
    #[serde(default)]
    pub split_loop: Option<String>,
}

impl From<WriteConfig> for WriteSettings {
    fn from(cfg: WriteConfig) -> Self {
        WriteSettings {
            omit_hash: cfg.omit_hash,
            force_loop: cfg.force_loop,
            split_loop: cfg.split_loop,
        }
    }
}

/// Dictionary source used to build the typing table.
#[derive(Debug, Clone, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default)]
    pub path: Option<String>,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<MmcifConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<MmcifConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert!(!config.write.omit_hash);
        assert!(!config.write.force_loop);
        assert!(config.write.split_loop.is_none());
        assert!(config.dictionary.path.is_none());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("write.force_loop", true)
            .expect("override to apply")
            .set_override("write.split_loop", "==")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert!(config.write.force_loop);
        assert_eq!(config.write.split_loop.as_deref(), Some("=="));
    }

    #[test]
    fn converts_to_write_settings() {
        let config = load_defaults().unwrap();
        let settings: WriteSettings = config.write.into();
        assert!(!settings.omit_hash);
    }
}
