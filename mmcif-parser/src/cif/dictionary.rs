//! Dictionary type resolver.
//!
//! Builds a [`TypingTable`] — `{category → {item → coercion kind}}` — from
//! a dictionary schema source: a parsed dictionary-style CIF document
//! (save frames named `_category.item`, each carrying an `item_type`
//! category with a `code` item), the equivalent JSON shape, or a pre-built
//! code map. The table is built once and treated as read-only shared
//! state; [`install`] swaps the process-wide table under a write lock so
//! that rebuilding never races in-flight normalization.

use crate::cif::error::DictionaryError;
use crate::cif::model::{Document, Value};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// The closed set of scalar coercions a dictionary can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    Int,
    Float,
    IntRange,
    FloatRange,
    Bool,
}

impl CoercionKind {
    /// Maps a dictionary `item_type` code to a kind. Unrecognized codes
    /// yield `None` and the tag stays untyped.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "int" | "positive_int" => Some(CoercionKind::Int),
            "float" => Some(CoercionKind::Float),
            "int-range" => Some(CoercionKind::IntRange),
            "float-range" => Some(CoercionKind::FloatRange),
            "boolean" => Some(CoercionKind::Bool),
            _ => None,
        }
    }

    /// Applies the coercion to raw text. `None` means the text failed the
    /// kind's parse; the caller is responsible for turning that into a
    /// [`CoercionError`](crate::cif::error::CoercionError) with context.
    pub fn coerce(&self, raw: &str) -> Option<Value> {
        match self {
            CoercionKind::Int => raw.parse::<i64>().ok().map(Value::Int),
            CoercionKind::Float => parse_float(raw).map(Value::Float),
            CoercionKind::IntRange => {
                let parts = split_range(raw)?;
                let mut out = Vec::with_capacity(2);
                for part in parts {
                    out.push(part.parse::<i64>().ok()?);
                }
                Some(Value::IntRange(out))
            }
            CoercionKind::FloatRange => {
                let parts = split_range(raw)?;
                let mut out = Vec::with_capacity(2);
                for part in parts {
                    out.push(parse_float(part)?);
                }
                Some(Value::FloatRange(out))
            }
            CoercionKind::Bool => Some(Value::Bool(raw.eq_ignore_ascii_case("yes"))),
        }
    }
}

impl fmt::Display for CoercionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoercionKind::Int => "int",
            CoercionKind::Float => "float",
            CoercionKind::IntRange => "int-range",
            CoercionKind::FloatRange => "float-range",
            CoercionKind::Bool => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// Parses a float, tolerating CIF uncertainty notation (`50.123(4)`) by
/// dropping the parenthesized suffix.
fn parse_float(raw: &str) -> Option<f64> {
    let raw = match raw.find('(') {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    raw.parse::<f64>().ok()
}

/// Splits range text on a `-` separator located at or after the second
/// character, so a leading sign is never mistaken for the separator.
/// Without a separator the whole text is a one-element range.
fn split_range(raw: &str) -> Option<Vec<&str>> {
    if raw.is_empty() {
        return None;
    }
    match raw[1..].find('-') {
        Some(pos) => {
            let sep = pos + 1;
            Some(vec![&raw[..sep], &raw[sep + 1..]])
        }
        None => Some(vec![raw]),
    }
}

/// Strips `save_` and `_` prefixes off a dictionary tag identifier and
/// splits it into `(category, item)`.
fn tag_components(key: &str) -> Option<(&str, &str)> {
    let key = key.strip_prefix("save_").unwrap_or(key);
    let key = key.strip_prefix('_').unwrap_or(key);
    key.split_once('.')
}

/// Read-only mapping from `(category, item)` to a coercion kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypingTable {
    map: HashMap<String, HashMap<String, CoercionKind>>,
}

impl TypingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a pre-built mapping equivalent to the resolver's output.
    pub fn from_map(map: HashMap<String, HashMap<String, CoercionKind>>) -> Self {
        TypingTable { map }
    }

    pub fn insert(&mut self, category: &str, item: &str, kind: CoercionKind) {
        self.map
            .entry(category.to_string())
            .or_default()
            .insert(item.to_string(), kind);
    }

    pub fn get(&self, category: &str, item: &str) -> Option<CoercionKind> {
        self.map.get(category)?.get(item).copied()
    }

    /// All typed items of one category, if any.
    pub fn category(&self, category: &str) -> Option<&HashMap<String, CoercionKind>> {
        self.map.get(category)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of typed tags across all categories.
    pub fn len(&self) -> usize {
        self.map.values().map(|items| items.len()).sum()
    }

    /// Builds the table from a parsed dictionary-style CIF document: the
    /// first data block's save frames are named `_category.item` and carry
    /// an `item_type` category whose `code` item holds the type code.
    pub fn from_document(doc: &Document) -> Result<Self, DictionaryError> {
        let (_, block) = doc
            .blocks()
            .next()
            .ok_or(DictionaryError::NoBlocks)?;
        let mut table = TypingTable::new();
        for (frame_name, frame) in block.frames() {
            let code = frame
                .category("item_type")
                .and_then(|cat| cat.get("code"))
                .and_then(|col| col.first())
                .and_then(Value::as_str);
            let (category, item) = match tag_components(frame_name) {
                Some(parts) => parts,
                None => continue,
            };
            if let Some(kind) = code.and_then(CoercionKind::from_code) {
                table.insert(category, item, kind);
            }
        }
        Ok(table)
    }

    /// Builds the table from a JSON schema source. Two shapes are
    /// accepted:
    ///
    /// - a dictionary document: the top-level single entry maps tag
    ///   identifiers (`_category.item`, optionally `save_`-prefixed) to
    ///   objects carrying `{"item_type": {"code": [<code>, ...]}}`;
    /// - a pre-built code map: `{category: {item: <code>}}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, DictionaryError> {
        let root = value
            .as_object()
            .ok_or_else(|| DictionaryError::Malformed("top level is not an object".into()))?;

        let mut table = TypingTable::new();

        // pre-built code map: values are {item: "code"} objects
        let prebuilt = root.values().all(|v| {
            v.as_object()
                .map(|items| items.values().all(|code| code.is_string()))
                .unwrap_or(false)
        });
        if prebuilt && !root.is_empty() {
            for (category, items) in root {
                for (item, code) in items.as_object().into_iter().flatten() {
                    if let Some(kind) = code.as_str().and_then(CoercionKind::from_code) {
                        table.insert(category, item, kind);
                    }
                }
            }
            return Ok(table);
        }

        let block = root
            .values()
            .next()
            .and_then(|v| v.as_object())
            .ok_or_else(|| DictionaryError::Malformed("no dictionary block".into()))?;

        for (key, entry) in block {
            let code = entry
                .get("item_type")
                .and_then(|t| t.get("code"))
                .and_then(|c| match c {
                    serde_json::Value::Array(arr) => arr.first().and_then(|v| v.as_str()),
                    serde_json::Value::String(s) => Some(s.as_str()),
                    _ => None,
                });
            let (category, item) = match tag_components(key) {
                Some(parts) => parts,
                None => continue,
            };
            if let Some(kind) = code.and_then(CoercionKind::from_code) {
                table.insert(category, item, kind);
            }
        }
        Ok(table)
    }
}

static INSTALLED: Lazy<RwLock<Option<Arc<TypingTable>>>> = Lazy::new(|| RwLock::new(None));

/// Installs `table` as the process-wide shared typing table, replacing any
/// previous one. Load-then-swap: the exclusive section covers only the
/// pointer swap, so concurrent parses keep the table they already cloned.
pub fn install(table: TypingTable) -> Arc<TypingTable> {
    let table = Arc::new(table);
    *INSTALLED
        .write()
        .expect("typing table lock poisoned") = Some(Arc::clone(&table));
    table
}

/// The currently installed table, if any. Callers must treat `None` as
/// "no typing available".
pub fn installed() -> Option<Arc<TypingTable>> {
    INSTALLED
        .read()
        .expect("typing table lock poisoned")
        .clone()
}

/// Removes the installed table.
pub fn clear_installed() {
    *INSTALLED
        .write()
        .expect("typing table lock poisoned") = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("int", Some(CoercionKind::Int))]
    #[case("positive_int", Some(CoercionKind::Int))]
    #[case("float", Some(CoercionKind::Float))]
    #[case("int-range", Some(CoercionKind::IntRange))]
    #[case("float-range", Some(CoercionKind::FloatRange))]
    #[case("boolean", Some(CoercionKind::Bool))]
    #[case("line", None)]
    #[case("code", None)]
    fn code_mapping(#[case] code: &str, #[case] expected: Option<CoercionKind>) {
        assert_eq!(CoercionKind::from_code(code), expected);
    }

    #[rstest]
    #[case("-5-10", Value::IntRange(vec![-5, 10]))]
    #[case("7", Value::IntRange(vec![7]))]
    #[case("3-9", Value::IntRange(vec![3, 9]))]
    #[case("-12", Value::IntRange(vec![-12]))]
    fn int_range_coercion(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(CoercionKind::IntRange.coerce(raw), Some(expected));
    }

    #[test]
    fn float_range_coercion() {
        assert_eq!(
            CoercionKind::FloatRange.coerce("1.5-2.5"),
            Some(Value::FloatRange(vec![1.5, 2.5]))
        );
        assert_eq!(
            CoercionKind::FloatRange.coerce("0.5"),
            Some(Value::FloatRange(vec![0.5]))
        );
    }

    #[test]
    fn scalar_coercions() {
        assert_eq!(CoercionKind::Int.coerce("42"), Some(Value::Int(42)));
        assert_eq!(CoercionKind::Int.coerce("-3"), Some(Value::Int(-3)));
        assert_eq!(CoercionKind::Float.coerce("3.5"), Some(Value::Float(3.5)));
        assert_eq!(
            CoercionKind::Float.coerce("50.123(4)"),
            Some(Value::Float(50.123))
        );
        assert_eq!(CoercionKind::Bool.coerce("YES"), Some(Value::Bool(true)));
        assert_eq!(CoercionKind::Bool.coerce("no"), Some(Value::Bool(false)));
    }

    #[test]
    fn malformed_numbers_fail() {
        assert_eq!(CoercionKind::Int.coerce("abc"), None);
        assert_eq!(CoercionKind::Float.coerce("abc"), None);
        assert_eq!(CoercionKind::IntRange.coerce("a-b"), None);
    }

    #[test]
    fn table_from_dictionary_document() {
        let input = "\
data_dict
save__cell.length_a
_item_type.code float
save_
save__entity.id
_item_type.code int
save_
save__entry.title
_item_type.code line
save_
";
        let doc = crate::cif::parser::parse(input).unwrap();
        let table = TypingTable::from_document(&doc).unwrap();
        assert_eq!(table.get("cell", "length_a"), Some(CoercionKind::Float));
        assert_eq!(table.get("entity", "id"), Some(CoercionKind::Int));
        // unrecognized code stays untyped
        assert_eq!(table.get("entry", "title"), None);
    }

    #[test]
    fn table_from_json_dictionary_shape() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"data_dict": {
                "save__cell.length_a": {"item_type": {"code": ["float"]}},
                "save__entity.id": {"item_type": {"code": ["int"]}},
                "category_ignored": {"other": [1]}
            }}"#,
        )
        .unwrap();
        let table = TypingTable::from_json(&json).unwrap();
        assert_eq!(table.get("cell", "length_a"), Some(CoercionKind::Float));
        assert_eq!(table.get("entity", "id"), Some(CoercionKind::Int));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn table_from_prebuilt_code_map() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"cell": {"length_a": "float", "z_pdb": "int"},
                "entry": {"id": "code"}}"#,
        )
        .unwrap();
        let table = TypingTable::from_json(&json).unwrap();
        assert_eq!(table.get("cell", "length_a"), Some(CoercionKind::Float));
        assert_eq!(table.get("cell", "z_pdb"), Some(CoercionKind::Int));
        assert_eq!(table.get("entry", "id"), None);
    }

    #[test]
    fn install_swaps_the_shared_table() {
        let mut table = TypingTable::new();
        table.insert("cell", "length_a", CoercionKind::Float);
        install(table);
        let shared = installed().unwrap();
        assert_eq!(shared.get("cell", "length_a"), Some(CoercionKind::Float));
        clear_installed();
        assert!(installed().is_none());
    }
}
