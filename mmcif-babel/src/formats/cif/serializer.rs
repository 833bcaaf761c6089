//! CIF text serializer, buffered and streaming.
//!
//! Rendering rules mirror the input grammar: a category with exactly one
//! row renders as flat `_category.item value` lines padded to the longest
//! tag; zero or multiple rows (or `force_loop`) render as a `loop_` block
//! with per-column width padding. Null renders as `?` — the `.`/`?`
//! distinction is not reconstructed. A `#` delimiter line separates
//! categories and closes each scope unless suppressed.
//!
//! The streaming variant writes the same bytes to an injected async sink,
//! one chunk per structural line or row, awaiting each write before the
//! next chunk is produced.

use mmcif_parser::cif::{Block, Category, Document, Entry, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use std::future::Future;
use std::io;
use std::pin::Pin;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Serializer configuration.
#[derive(Debug, Clone, Default)]
pub struct WriteSettings {
    /// Suppress the structural `#` separator lines.
    pub omit_hash: bool,
    /// Render single-row categories in loop style too.
    pub force_loop: bool,
    /// Literal marker inserted as `#<marker>#` between a loop's tag
    /// declarations and its data rows.
    pub split_loop: Option<String>,
}

// Values carrying whitespace or parentheses need quoting; matches the
// reference grammar's check. Embedded quote characters are not escaped.
static QUOTE_NEEDED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s()]").expect("quoting pattern"));

/// Renders one value in CIF form: `?` for null, a `;`-delimited text field
/// for newline-bearing strings, single quotes for strings with whitespace
/// or parentheses, the natural text form for scalars.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "?".to_string(),
        Value::Str(s) => {
            if s.contains('\n') {
                format!("\n;{}\n;", s)
            } else if QUOTE_NEEDED.is_match(s) {
                format!("'{}'", s)
            } else {
                s.clone()
            }
        }
        Value::Int(i) => i.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::IntRange(r) => join_numbers(r.iter()),
        Value::FloatRange(r) => join_numbers(r.iter()),
    }
}

fn join_numbers<T: ToString, I: Iterator<Item = T>>(items: I) -> String {
    items
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn pad_end(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        let mut out = String::with_capacity(s.len() + width - len);
        out.push_str(s);
        out.extend(std::iter::repeat(' ').take(width - len));
        out
    }
}

/// Item-name padding for single-row categories: longest name plus a fixed
/// margin.
fn name_pad(cat: &Category) -> usize {
    cat.items()
        .map(|(item, _)| item.chars().count())
        .max()
        .unwrap_or(0)
        + 3
}

fn singleton_line(category: &str, item: &str, pad: usize, value: &Value) -> String {
    format!("_{}.{}{}\n", category, pad_end(item, pad), render_value(value))
}

fn tag_line(category: &str, item: &str) -> String {
    format!("_{}.{}\n", category, item)
}

/// Per-column render widths: the widest rendered value plus one, with
/// multi-line text fields excluded from the measurement.
fn column_widths(cat: &Category, rows: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = cat.items().map(|_| 0).collect();
    for row in 0..rows {
        for (j, (_, col)) in cat.items().enumerate() {
            let rendered = render_value(col.get(row).unwrap_or(&Value::Null));
            if !rendered.starts_with("\n;") {
                let len = rendered.chars().count();
                if len > widths[j] {
                    widths[j] = len;
                }
            }
        }
    }
    for w in &mut widths {
        *w += 1;
    }
    widths
}

fn row_line(cat: &Category, row: usize, widths: &[usize]) -> String {
    let mut line = String::new();
    for (j, (_, col)) in cat.items().enumerate() {
        let rendered = render_value(col.get(row).unwrap_or(&Value::Null));
        line.push_str(&pad_end(&rendered, widths[j]));
    }
    line.push('\n');
    line
}

/// Serialize a document to CIF text.
pub fn serialize(doc: &Document, settings: &WriteSettings) -> String {
    let mut out = String::new();
    if !doc.global().is_empty() {
        write_scope(&mut out, doc.global(), settings);
    }
    for (name, block) in doc.blocks() {
        out.push_str("data_");
        out.push_str(name);
        out.push('\n');
        write_scope(&mut out, block, settings);
    }
    out
}

fn write_scope(out: &mut String, block: &Block, settings: &WriteSettings) {
    for (name, entry) in block.entries() {
        match entry {
            Entry::Category(cat) => write_category(out, name, cat, settings),
            Entry::Frame(frame) => {
                out.push_str("save_");
                out.push_str(name);
                out.push('\n');
                write_scope(out, frame, settings);
                out.push_str("save_\n");
            }
            // category-less columns have no CIF rendering
            Entry::Item(_) => {}
        }
    }
    if !settings.omit_hash {
        out.push_str("#\n");
    }
}

fn write_category(out: &mut String, name: &str, cat: &Category, settings: &WriteSettings) {
    if !settings.omit_hash {
        out.push_str("#\n");
    }
    if cat.is_empty() {
        return;
    }
    let rows = cat.row_count();
    if rows == 0 && !settings.force_loop {
        return;
    }
    if rows == 1 && !settings.force_loop {
        let pad = name_pad(cat);
        for (item, col) in cat.items() {
            out.push_str(&singleton_line(
                name,
                item,
                pad,
                col.first().unwrap_or(&Value::Null),
            ));
        }
    } else {
        out.push_str("loop_\n");
        for (item, _) in cat.items() {
            out.push_str(&tag_line(name, item));
        }
        if let Some(marker) = &settings.split_loop {
            out.push_str(&format!("#{}#\n", marker));
        }
        let widths = column_widths(cat, rows);
        for row in 0..rows {
            out.push_str(&row_line(cat, row, &widths));
        }
    }
}

/// Stream a document as CIF text to an async sink, awaiting every chunk.
pub async fn stream<W>(doc: &Document, settings: &WriteSettings, sink: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    if !doc.global().is_empty() {
        stream_scope(doc.global(), settings, sink).await?;
    }
    for (name, block) in doc.blocks() {
        sink.write_all(format!("data_{}\n", name).as_bytes()).await?;
        stream_scope(block, settings, sink).await?;
    }
    sink.flush().await
}

fn stream_scope<'a, W>(
    block: &'a Block,
    settings: &'a WriteSettings,
    sink: &'a mut W,
) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + 'a>>
where
    W: AsyncWrite + Unpin + Send,
{
    Box::pin(async move {
        for (name, entry) in block.entries() {
            match entry {
                Entry::Category(cat) => stream_category(name, cat, settings, sink).await?,
                Entry::Frame(frame) => {
                    sink.write_all(format!("save_{}\n", name).as_bytes())
                        .await?;
                    stream_scope(frame, settings, &mut *sink).await?;
                    sink.write_all(b"save_\n").await?;
                }
                Entry::Item(_) => {}
            }
        }
        if !settings.omit_hash {
            sink.write_all(b"#\n").await?;
        }
        Ok(())
    })
}

async fn stream_category<W>(
    name: &str,
    cat: &Category,
    settings: &WriteSettings,
    sink: &mut W,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    if !settings.omit_hash {
        sink.write_all(b"#\n").await?;
    }
    if cat.is_empty() {
        return Ok(());
    }
    let rows = cat.row_count();
    if rows == 0 && !settings.force_loop {
        return Ok(());
    }
    if rows == 1 && !settings.force_loop {
        let pad = name_pad(cat);
        for (item, col) in cat.items() {
            let line = singleton_line(name, item, pad, col.first().unwrap_or(&Value::Null));
            sink.write_all(line.as_bytes()).await?;
        }
    } else {
        sink.write_all(b"loop_\n").await?;
        for (item, _) in cat.items() {
            sink.write_all(tag_line(name, item).as_bytes()).await?;
        }
        if let Some(marker) = &settings.split_loop {
            sink.write_all(format!("#{}#\n", marker).as_bytes()).await?;
        }
        let widths = column_widths(cat, rows);
        for row in 0..rows {
            sink.write_all(row_line(cat, row, &widths).as_bytes()).await?;
        }
    }
    Ok(())
}
