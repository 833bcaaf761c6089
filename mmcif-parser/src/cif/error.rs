//! Error types for parsing, dictionary loading, and type coercion.

use crate::cif::dictionary::CoercionKind;
use std::fmt;

/// A line could not be interpreted under the current parser state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A value token arrived with no open item target and no active loop.
    ValueWithoutTarget { value: String },
    /// A loop received a value before any column was declared.
    LoopWithoutColumns,
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::ValueWithoutTarget { value } => {
                write!(f, "value {:?} has no open item target and no active loop", value)
            }
            GrammarError::LoopWithoutColumns => {
                write!(f, "loop value arrived before any column was declared")
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// Fatal parse failure. Carries the offending line, its 0-based index, and
/// the underlying cause; no lines past it were processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: String,
    pub index: usize,
    pub cause: GrammarError,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error found in line {}: {}", self.index, self.cause)?;
        write!(f, "  {}", self.line)
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// A value failed its dictionary-declared numeric/boolean parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionError {
    pub category: String,
    pub item: String,
    pub value: String,
    pub kind: CoercionKind,
}

impl fmt::Display for CoercionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot coerce _{}.{} value {:?} as {}",
            self.category, self.item, self.value, self.kind
        )
    }
}

impl std::error::Error for CoercionError {}

/// The dictionary schema source could not be used.
///
/// Callers must treat an absent typing table as "no typing available"
/// rather than retrying silently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
    /// The dictionary document contains no data block to read frames from.
    NoBlocks,
    /// The source does not have the expected shape.
    Malformed(String),
}

impl fmt::Display for DictionaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryError::NoBlocks => {
                write!(f, "dictionary document contains no data blocks")
            }
            DictionaryError::Malformed(msg) => {
                write!(f, "malformed dictionary source: {}", msg)
            }
        }
    }
}

impl std::error::Error for DictionaryError {}
