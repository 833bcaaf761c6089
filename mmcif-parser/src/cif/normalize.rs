//! Type normalizer: null-sentinel conversion and dictionary coercion.
//!
//! Two passes over a full document. The null pass turns the format's two
//! null markers (`?` unknown, `.` inapplicable) into the universal
//! [`Value::Null`] and needs no dictionary. The coercion pass applies the
//! typing table's kinds to every raw value whose `(category, item)` pair is
//! declared; nulls pass through unchanged. Coercion failures are not
//! caught here — they surface to the caller.

use crate::cif::dictionary::{CoercionKind, TypingTable};
use crate::cif::error::CoercionError;
use crate::cif::model::{Block, Column, Document, Entry, Value};

/// Runs the null pass followed by the coercion pass.
pub fn normalize(doc: &mut Document, table: &TypingTable) -> Result<(), CoercionError> {
    normalize_nulls(doc);
    apply_types(doc, table)
}

/// Converts every raw `?` or `.` value to [`Value::Null`], in every column
/// of every scope, save frames included.
pub fn normalize_nulls(doc: &mut Document) {
    block_nulls(doc.global_mut());
    for (_, block) in doc.blocks_mut() {
        block_nulls(block);
    }
}

fn block_nulls(block: &mut Block) {
    for (_, entry) in block.entries_mut() {
        match entry {
            Entry::Category(cat) => {
                for (_, col) in cat.items_mut() {
                    column_nulls(col);
                }
            }
            Entry::Item(col) => column_nulls(col),
            Entry::Frame(frame) => block_nulls(frame),
        }
    }
}

fn column_nulls(col: &mut Column) {
    for value in col.iter_mut() {
        if matches!(value.as_str(), Some("?") | Some(".")) {
            *value = Value::Null;
        }
    }
}

/// Applies the typing table's coercions to every declared `(category,
/// item)` column. Values that are already typed, and nulls, are left
/// alone.
pub fn apply_types(doc: &mut Document, table: &TypingTable) -> Result<(), CoercionError> {
    block_types(doc.global_mut(), table)?;
    for (_, block) in doc.blocks_mut() {
        block_types(block, table)?;
    }
    Ok(())
}

fn block_types(block: &mut Block, table: &TypingTable) -> Result<(), CoercionError> {
    for (name, entry) in block.entries_mut() {
        match entry {
            Entry::Category(cat) => {
                let items = match table.category(name) {
                    Some(items) => items,
                    None => continue,
                };
                for (item, col) in cat.items_mut() {
                    if let Some(kind) = items.get(item) {
                        coerce_column(name, item, col, *kind)?;
                    }
                }
            }
            Entry::Frame(frame) => block_types(frame, table)?,
            Entry::Item(_) => {}
        }
    }
    Ok(())
}

fn coerce_column(
    category: &str,
    item: &str,
    col: &mut Column,
    kind: CoercionKind,
) -> Result<(), CoercionError> {
    for value in col.iter_mut() {
        if let Value::Str(raw) = value {
            match kind.coerce(raw) {
                Some(typed) => *value = typed,
                None => {
                    return Err(CoercionError {
                        category: category.to_string(),
                        item: item.to_string(),
                        value: raw.clone(),
                        kind,
                    })
                }
            }
        }
    }
    Ok(())
}
