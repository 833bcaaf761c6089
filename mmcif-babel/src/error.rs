//! Error type shared by all format implementations.

use std::fmt;

/// Errors surfaced by format parsing and serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No format registered under the requested name.
    FormatNotFound(String),
    /// The format does not support the requested direction.
    NotSupported(String),
    /// Underlying parse failure (CIF grammar, XML syntax).
    Parse(String),
    /// Underlying serialization failure.
    Serialize(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "format not found: {}", name),
            FormatError::NotSupported(msg) => write!(f, "not supported: {}", msg),
            FormatError::Parse(msg) => write!(f, "parse error: {}", msg),
            FormatError::Serialize(msg) => write!(f, "serialize error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}
