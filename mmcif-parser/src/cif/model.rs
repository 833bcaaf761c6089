//! Hierarchical CIF data model.
//!
//! A [`Document`] maps top-level scopes (an implicit global scope plus named
//! `data_` blocks) to [`Block`]s. A block holds named entries in insertion
//! order: categories, category-less columns (old-style tags without a `.`
//! separator), and save frames. A [`Category`] maps item names to
//! [`Column`]s of values, one value per logical row.
//!
//! Insertion order is preserved at every level because serialization
//! fidelity depends on it. All columns within one category must have equal
//! length; the invariant is violated only transiently during parsing and
//! repaired via null-padding before a document is handed to a caller (see
//! [`Document::repair`]).

use serde::{Serialize, Serializer};

/// A single CIF value.
///
/// Values start life as raw strings. The type normalizer converts the
/// format's two null sentinels (`?` unknown, `.` inapplicable) to the
/// universal [`Value::Null`] — a deliberate, lossy conflation — and applies
/// dictionary-declared coercions to produce the scalar variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Universal null, covering both `?` and `.` markers.
    Null,
    Str(String),
    Int(i64),
    Float(f64),
    /// `[low, high]` pair, or a single element when no separator was present.
    IntRange(Vec<i64>),
    FloatRange(Vec<f64>),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string content for raw (untyped) values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::IntRange(r) => r.serialize(serializer),
            Value::FloatRange(r) => r.serialize(serializer),
            Value::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// An ordered sequence of values, one per logical row.
pub type Column = Vec<Value>;

/// A named group of items sharing one row set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    items: Vec<(String, Column)>,
}

impl Category {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, item: &str) -> Option<&Column> {
        self.items
            .iter()
            .find(|(name, _)| name == item)
            .map(|(_, col)| col)
    }

    /// Returns the column for `item`, creating an empty one if absent.
    /// Insertion order of first reference is preserved.
    pub fn column_mut(&mut self, item: &str) -> &mut Column {
        if let Some(idx) = self.items.iter().position(|(name, _)| name == item) {
            return &mut self.items[idx].1;
        }
        self.items.push((item.to_string(), Vec::new()));
        &mut self.items.last_mut().unwrap().1
    }

    /// Iterate `(item name, column)` pairs in insertion order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.items.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub fn items_mut(&mut self) -> impl Iterator<Item = (&str, &mut Column)> {
        self.items
            .iter_mut()
            .map(|(name, col)| (name.as_str(), col))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of logical rows: the longest column's length.
    ///
    /// After [`repair_lengths`](Self::repair_lengths) all columns agree.
    pub fn row_count(&self) -> usize {
        self.items.iter().map(|(_, col)| col.len()).max().unwrap_or(0)
    }

    /// Null-pads every column behind the longest one so that all columns
    /// end equal-length.
    pub fn repair_lengths(&mut self) {
        let rows = self.row_count();
        for (_, col) in &mut self.items {
            while col.len() < rows {
                col.push(Value::Null);
            }
        }
    }

    /// Null-pads every column shorter than `rows`. Used by row-oriented
    /// ingestion (PDBML) where padding happens per row rather than at
    /// document teardown.
    pub fn pad_to(&mut self, rows: usize) {
        for (_, col) in &mut self.items {
            while col.len() < rows {
                col.push(Value::Null);
            }
        }
    }
}

/// One named entry within a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Category(Category),
    /// A category-less column from an old-style tag with no `.` separator.
    Item(Column),
    /// A save frame: a nested sub-document, used by dictionary-style files.
    Frame(Block),
}

/// A data block (or the implicit global scope, or a save frame's body).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    entries: Vec<(String, Entry)>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate all entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(name, e)| (name.as_str(), e))
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.entries.iter().find_map(|(n, e)| match e {
            Entry::Category(cat) if n == name => Some(cat),
            _ => None,
        })
    }

    pub fn frame(&self, name: &str) -> Option<&Block> {
        self.entries.iter().find_map(|(n, e)| match e {
            Entry::Frame(block) if n == name => Some(block),
            _ => None,
        })
    }

    /// Iterate save frames in insertion order.
    pub fn frames(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.entries.iter().filter_map(|(n, e)| match e {
            Entry::Frame(block) => Some((n.as_str(), block)),
            _ => None,
        })
    }

    /// Returns the category named `name`, creating it if absent. An
    /// existing entry of a different kind under the same name is replaced.
    pub fn category_mut(&mut self, name: &str) -> &mut Category {
        if let Some(idx) = self.entries.iter().position(|(n, _)| n == name) {
            if !matches!(self.entries[idx].1, Entry::Category(_)) {
                self.entries[idx].1 = Entry::Category(Category::new());
            }
            match &mut self.entries[idx].1 {
                Entry::Category(cat) => return cat,
                _ => unreachable!(),
            }
        }
        self.entries
            .push((name.to_string(), Entry::Category(Category::new())));
        match &mut self.entries.last_mut().unwrap().1 {
            Entry::Category(cat) => cat,
            _ => unreachable!(),
        }
    }

    /// Returns the category-less column named `name`, creating it if absent.
    pub fn item_mut(&mut self, name: &str) -> &mut Column {
        if let Some(idx) = self.entries.iter().position(|(n, _)| n == name) {
            if !matches!(self.entries[idx].1, Entry::Item(_)) {
                self.entries[idx].1 = Entry::Item(Vec::new());
            }
            match &mut self.entries[idx].1 {
                Entry::Item(col) => return col,
                _ => unreachable!(),
            }
        }
        self.entries.push((name.to_string(), Entry::Item(Vec::new())));
        match &mut self.entries.last_mut().unwrap().1 {
            Entry::Item(col) => col,
            _ => unreachable!(),
        }
    }

    /// Index of the save frame named `name`, creating it if absent.
    ///
    /// Indices stay valid for the rest of a parse because entries are
    /// append-only; the parser's context stack stores them instead of
    /// holding live references into the tree.
    pub fn frame_index_mut(&mut self, name: &str) -> usize {
        if let Some(idx) = self.entries.iter().position(|(n, _)| n == name) {
            if !matches!(self.entries[idx].1, Entry::Frame(_)) {
                self.entries[idx].1 = Entry::Frame(Block::new());
            }
            return idx;
        }
        self.entries
            .push((name.to_string(), Entry::Frame(Block::new())));
        self.entries.len() - 1
    }

    /// Mutable access to the frame at an index previously returned by
    /// [`frame_index_mut`](Self::frame_index_mut).
    pub fn frame_at_mut(&mut self, idx: usize) -> Option<&mut Block> {
        match self.entries.get_mut(idx) {
            Some((_, Entry::Frame(block))) => Some(block),
            _ => None,
        }
    }

    /// Iterate categories (skipping frames and bare items).
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.entries.iter().filter_map(|(n, e)| match e {
            Entry::Category(cat) => Some((n.as_str(), cat)),
            _ => None,
        })
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut Entry)> {
        self.entries.iter_mut().map(|(n, e)| (n.as_str(), e))
    }

    fn repair(&mut self) {
        for (_, entry) in &mut self.entries {
            match entry {
                Entry::Category(cat) => cat.repair_lengths(),
                Entry::Frame(block) => block.repair(),
                Entry::Item(_) => {}
            }
        }
    }
}

/// A complete parsed document: the implicit global scope plus named data
/// blocks, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    global: Block,
    blocks: Vec<(String, Block)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// The implicit global scope: content seen before any `data_` directive.
    pub fn global(&self) -> &Block {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Block {
        &mut self.global
    }

    /// Named data block, by name without the `data_` prefix.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    /// Iterate named blocks in input order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(n, b)| (n.as_str(), b))
    }

    pub fn blocks_mut(&mut self) -> impl Iterator<Item = (&str, &mut Block)> {
        self.blocks.iter_mut().map(|(n, b)| (n.as_str(), b))
    }

    /// Index of the block named `name`, creating it if absent.
    pub fn block_index_mut(&mut self, name: &str) -> usize {
        if let Some(idx) = self.blocks.iter().position(|(n, _)| n == name) {
            return idx;
        }
        self.blocks.push((name.to_string(), Block::new()));
        self.blocks.len() - 1
    }

    pub fn block_at_mut(&mut self, idx: usize) -> &mut Block {
        &mut self.blocks[idx].1
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.blocks.is_empty()
    }

    /// Restores the equal-column-length invariant in every category of
    /// every scope, appending nulls to columns that fell behind (ragged
    /// loops, items declared without a value).
    pub fn repair(&mut self) {
        self.global.repair();
        for (_, block) in &mut self.blocks {
            block.repair();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_preserves_insertion_order() {
        let mut cat = Category::new();
        cat.column_mut("zeta").push(Value::Str("1".into()));
        cat.column_mut("alpha").push(Value::Str("2".into()));
        let names: Vec<_> = cat.items().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn column_mut_reuses_existing() {
        let mut cat = Category::new();
        cat.column_mut("a").push(Value::Str("1".into()));
        cat.column_mut("a").push(Value::Str("2".into()));
        assert_eq!(cat.get("a").unwrap().len(), 2);
    }

    #[test]
    fn repair_pads_short_columns() {
        let mut cat = Category::new();
        cat.column_mut("a").extend(vec![
            Value::Str("1".into()),
            Value::Str("2".into()),
        ]);
        cat.column_mut("b").push(Value::Str("x".into()));
        cat.repair_lengths();
        assert_eq!(cat.get("b").unwrap().len(), 2);
        assert_eq!(cat.get("b").unwrap()[1], Value::Null);
    }

    #[test]
    fn document_repair_reaches_frames() {
        let mut doc = Document::new();
        let idx = doc.block_index_mut("x");
        let block = doc.block_at_mut(idx);
        let fidx = block.frame_index_mut("f");
        let frame = block.frame_at_mut(fidx).unwrap();
        frame.category_mut("c").column_mut("a").push(Value::Null);
        frame.category_mut("c").column_mut("b");
        doc.repair();
        let frame = doc.block("x").unwrap().frame("f").unwrap();
        assert_eq!(frame.category("c").unwrap().get("b").unwrap().len(), 1);
    }

    #[test]
    fn value_serializes_to_json_forms() {
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Value::Str("hi".into())).unwrap(),
            "\"hi\""
        );
        assert_eq!(serde_json::to_string(&Value::Int(-3)).unwrap(), "-3");
        assert_eq!(
            serde_json::to_string(&Value::IntRange(vec![-5, 10])).unwrap(),
            "[-5,10]"
        );
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
    }
}
