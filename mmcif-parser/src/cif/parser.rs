//! Directive state machine: the core CIF parser.
//!
//! Consumes tokens line by line, maintaining the active block/frame scope,
//! the currently open item target, the loop column router, and the
//! multi-line text buffer. Any error aborts the parse for the whole
//! document; the error carries the offending line, its 0-based index, and
//! the cause. There is no partial recovery.

use crate::cif::error::{GrammarError, ParseError};
use crate::cif::model::{Block, Document, Value};
use crate::cif::tokenize::{split_fields, Field};

/// Parse CIF text into a [`Document`].
///
/// The input is consumed line by line; see [`CifParser`] for incremental
/// feeding. Column lengths are repaired (null-padded) before the document
/// is returned.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    let mut parser = CifParser::new();
    for line in input.lines() {
        parser.feed(line)?;
    }
    Ok(parser.finish())
}

/// Which top-level scope values are being written into.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Global,
    Block(usize),
}

/// The currently open singleton write target.
///
/// `consumed` flips when a value token lands; later value tokens on the
/// same target are silently skipped, but a semicolon text field still
/// replaces it.
#[derive(Debug, Clone)]
enum Pending {
    None,
    Open {
        category: Option<String>,
        item: String,
        consumed: bool,
    },
}

/// Column declaration vs. value phase of an active loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterPhase {
    Declaring,
    Filling,
}

#[derive(Debug, Clone)]
struct ColumnRef {
    category: Option<String>,
    item: String,
}

/// Routes a flat run of value tokens round-robin onto the columns declared
/// at the head of a `loop_` block.
#[derive(Debug)]
struct LoopRouter {
    columns: Vec<ColumnRef>,
    cursor: usize,
    phase: RouterPhase,
}

impl LoopRouter {
    fn new() -> Self {
        LoopRouter {
            columns: Vec::new(),
            cursor: 0,
            phase: RouterPhase::Declaring,
        }
    }

    /// Registers the next loop column, creating the backing column in the
    /// scope if the category lacks it. Existing columns are kept: a second
    /// loop over the same tags appends to them.
    fn declare(&mut self, scope: &mut Block, tag: &str) {
        let (category, item) = partition(tag);
        match category {
            Some(cat) => {
                scope.category_mut(cat).column_mut(item);
            }
            None => {
                scope.item_mut(item);
            }
        }
        self.columns.push(ColumnRef {
            category: category.map(str::to_string),
            item: item.to_string(),
        });
    }

    fn push(&mut self, scope: &mut Block, value: Value) -> Result<(), GrammarError> {
        self.phase = RouterPhase::Filling;
        if self.columns.is_empty() {
            return Err(GrammarError::LoopWithoutColumns);
        }
        let target = &self.columns[self.cursor];
        self.cursor = (self.cursor + 1) % self.columns.len();
        let column = match &target.category {
            Some(cat) => scope.category_mut(cat).column_mut(&target.item),
            None => scope.item_mut(&target.item),
        };
        column.push(value);
        Ok(())
    }
}

/// Splits a tag (without its leading `_`) on the first `.` into
/// `(category, item)`. Tags without a separator address a category-less
/// column at block level.
fn partition(tag: &str) -> (Option<&str>, &str) {
    match tag.split_once('.') {
        Some((cat, item)) if !item.is_empty() => (Some(cat), item),
        Some((cat, _)) => (None, cat),
        None => (None, tag),
    }
}

/// Incremental CIF parser.
///
/// Feed lines with [`feed`](Self::feed); a returned error is fatal and no
/// further lines should be offered. [`finish`](Self::finish) repairs
/// column lengths and yields the document. An unterminated semicolon text
/// field at end of input is discarded.
#[derive(Debug)]
pub struct CifParser {
    doc: Document,
    scope: Scope,
    frame: Option<usize>,
    pending: Pending,
    router: Option<LoopRouter>,
    multi_line: bool,
    buffer: Vec<String>,
    line_no: usize,
}

impl CifParser {
    pub fn new() -> Self {
        CifParser {
            doc: Document::new(),
            scope: Scope::Global,
            frame: None,
            pending: Pending::None,
            router: None,
            multi_line: false,
            buffer: Vec::new(),
            line_no: 0,
        }
    }

    /// Process one line. The internal line counter provides the 0-based
    /// index recorded on errors.
    pub fn feed(&mut self, raw: &str) -> Result<(), ParseError> {
        let index = self.line_no;
        self.line_no += 1;
        self.process_line(raw).map_err(|cause| ParseError {
            line: raw.to_string(),
            index,
            cause,
        })
    }

    /// Consume the parser, repair column lengths everywhere, and return
    /// the document.
    pub fn finish(mut self) -> Document {
        self.doc.repair();
        self.doc
    }

    fn process_line(&mut self, raw: &str) -> Result<(), GrammarError> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let first = raw.chars().next();

        if first == Some('#') && !self.multi_line {
            return Ok(());
        }

        if first == Some(';') {
            let rest = raw.trim();
            let rest = rest[1..].trim();
            if self.multi_line {
                let text = self.buffer.join("\n");
                self.buffer.clear();
                self.multi_line = false;
                self.set_value(Value::Str(text), true)?;
                return self.process_fields(rest);
            }
            self.buffer.clear();
            self.multi_line = true;
            self.buffer.push(rest.to_string());
            return Ok(());
        }

        if self.multi_line {
            self.buffer.push(raw.to_string());
            return Ok(());
        }

        self.process_fields(raw.trim())
    }

    fn process_fields(&mut self, content: &str) -> Result<(), GrammarError> {
        for field in split_fields(content) {
            self.process_field(field)?;
        }
        Ok(())
    }

    fn process_field(&mut self, field: Field) -> Result<(), GrammarError> {
        let Field { text, quoted } = field;
        if !quoted && text.starts_with("data_") {
            self.router = None;
            self.select_data(&text[5..]);
            Ok(())
        } else if !quoted && text.starts_with("save_") {
            self.router = None;
            if text.len() > 5 {
                self.select_frame(&text[5..]);
            } else {
                self.end_frame();
            }
            Ok(())
        } else if !quoted && text == "loop_" {
            self.router = Some(LoopRouter::new());
            Ok(())
        } else if !quoted && text.starts_with('_') {
            self.open_tag(&text[1..]);
            Ok(())
        } else {
            self.accept_value(text)
        }
    }

    fn select_data(&mut self, name: &str) {
        let idx = self.doc.block_index_mut(name);
        self.scope = Scope::Block(idx);
        self.frame = None;
        self.pending = Pending::None;
    }

    /// Opens a save frame. Frames always attach at block level; a
    /// `save_<x>` while another frame is open replaces the active frame
    /// rather than nesting.
    fn select_frame(&mut self, name: &str) {
        let block = self.block_mut();
        let fidx = block.frame_index_mut(name);
        self.frame = Some(fidx);
        self.pending = Pending::None;
    }

    fn end_frame(&mut self) {
        self.frame = None;
        self.pending = Pending::None;
    }

    fn block_mut(&mut self) -> &mut Block {
        match self.scope {
            Scope::Global => self.doc.global_mut(),
            Scope::Block(idx) => self.doc.block_at_mut(idx),
        }
    }

    fn active_scope_mut(&mut self) -> &mut Block {
        let frame = self.frame;
        let block = self.block_mut();
        match frame {
            Some(fidx) => block
                .frame_at_mut(fidx)
                .expect("frame index tracked by parser"),
            None => block,
        }
    }

    fn open_tag(&mut self, name: &str) {
        if let Some(router) = self.router.take() {
            if router.phase == RouterPhase::Declaring {
                let mut router = router;
                let scope = self.active_scope_mut();
                router.declare(scope, name);
                self.router = Some(router);
                return;
            }
            // first tag after the value phase ends the loop; the tag is a
            // new standalone item
        }
        let (category, item) = partition(name);
        let category = category.map(str::to_string);
        let item = item.to_string();
        let scope = self.active_scope_mut();
        let column = match &category {
            Some(cat) => scope.category_mut(cat).column_mut(&item),
            None => scope.item_mut(&item),
        };
        column.clear();
        self.pending = Pending::Open {
            category,
            item,
            consumed: false,
        };
    }

    fn accept_value(&mut self, text: String) -> Result<(), GrammarError> {
        self.set_value(Value::Str(text), false)
    }

    /// Stores a value. `from_text_field` marks a semicolon text field,
    /// which replaces an already-consumed singleton target instead of
    /// being skipped.
    fn set_value(&mut self, value: Value, from_text_field: bool) -> Result<(), GrammarError> {
        if let Some(mut router) = self.router.take() {
            // legacy early-exit marker: terminate the loop, do not store
            if value.as_str() == Some("stop_") {
                return Ok(());
            }
            let scope = self.active_scope_mut();
            let result = router.push(scope, value);
            self.router = Some(router);
            return result;
        }

        match self.pending.clone() {
            Pending::Open {
                category,
                item,
                consumed,
            } => {
                if consumed && !from_text_field {
                    return Ok(());
                }
                let scope = self.active_scope_mut();
                let column = match &category {
                    Some(cat) => scope.category_mut(cat).column_mut(&item),
                    None => scope.item_mut(&item),
                };
                column.clear();
                column.push(value);
                self.pending = Pending::Open {
                    category,
                    item,
                    consumed: true,
                };
                Ok(())
            }
            Pending::None => Err(GrammarError::ValueWithoutTarget {
                value: match value {
                    Value::Str(s) => s,
                    other => format!("{:?}", other),
                },
            }),
        }
    }
}

impl Default for CifParser {
    fn default() -> Self {
        Self::new()
    }
}
