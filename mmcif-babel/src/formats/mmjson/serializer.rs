//! mmJSON emitter, buffered and streaming.
//!
//! mmJSON is a JSON object keyed by block name (`data_<name>`, with the
//! implicit global scope under `global_`), each block an object keyed by
//! category name, each category an object mapping item names to their
//! column arrays. Save frames appear inside their block under a
//! `save_<name>` key. Key order follows document insertion order.
//!
//! The streaming variant writes block/category/item boundaries as they are
//! reached instead of buffering the whole object, awaiting each chunk.

use mmcif_parser::cif::{Block, Category, Document, Entry};
use serde_json::{Map, Value as Json};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Builds the complete mmJSON value for a document.
pub fn to_value(doc: &Document) -> Json {
    let mut root = Map::new();
    if !doc.global().is_empty() {
        root.insert("global_".to_string(), block_value(doc.global()));
    }
    for (name, block) in doc.blocks() {
        root.insert(format!("data_{}", name), block_value(block));
    }
    Json::Object(root)
}

fn block_value(block: &Block) -> Json {
    let mut map = Map::new();
    for (name, entry) in block.entries() {
        match entry {
            Entry::Category(cat) => {
                map.insert(name.to_string(), category_value(cat));
            }
            Entry::Item(col) => {
                map.insert(name.to_string(), column_json(col));
            }
            Entry::Frame(frame) => {
                map.insert(format!("save_{}", name), block_value(frame));
            }
        }
    }
    Json::Object(map)
}

fn category_value(cat: &Category) -> Json {
    let mut map = Map::new();
    for (item, col) in cat.items() {
        map.insert(item.to_string(), column_json(col));
    }
    Json::Object(map)
}

fn column_json(col: &[mmcif_parser::cif::Value]) -> Json {
    serde_json::to_value(col).unwrap_or(Json::Null)
}

fn encode_err(e: serde_json::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

/// Streams the mmJSON object to an async sink, one chunk per structural
/// boundary or column, preserving document order.
pub async fn stream<W>(doc: &Document, sink: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    sink.write_all(b"{").await?;
    let mut first = true;
    if !doc.global().is_empty() {
        stream_block("global_", doc.global(), first, sink).await?;
        first = false;
    }
    for (name, block) in doc.blocks() {
        stream_block(&format!("data_{}", name), block, first, sink).await?;
        first = false;
    }
    sink.write_all(b"}").await?;
    sink.flush().await
}

async fn stream_block<W>(key: &str, block: &Block, first: bool, sink: &mut W) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let header = format!(
        "{}{}:{{",
        if first { "" } else { "," },
        serde_json::to_string(key).map_err(encode_err)?
    );
    sink.write_all(header.as_bytes()).await?;

    let mut first_entry = true;
    for (name, entry) in block.entries() {
        match entry {
            Entry::Category(cat) => {
                stream_category(name, cat, first_entry, sink).await?;
            }
            Entry::Item(col) => {
                let chunk = format!(
                    "{}{}:{}",
                    if first_entry { "" } else { "," },
                    serde_json::to_string(name).map_err(encode_err)?,
                    serde_json::to_string(col).map_err(encode_err)?
                );
                sink.write_all(chunk.as_bytes()).await?;
            }
            Entry::Frame(frame) => {
                // frames never nest below one level; emit the frame's
                // categories inline under its save_ key
                let fkey = format!("save_{}", name);
                let header = format!(
                    "{}{}:{{",
                    if first_entry { "" } else { "," },
                    serde_json::to_string(&fkey).map_err(encode_err)?
                );
                sink.write_all(header.as_bytes()).await?;
                let mut first_inner = true;
                for (cname, fentry) in frame.entries() {
                    if let Entry::Category(cat) = fentry {
                        stream_category(cname, cat, first_inner, sink).await?;
                        first_inner = false;
                    }
                }
                sink.write_all(b"}").await?;
            }
        }
        first_entry = false;
    }
    sink.write_all(b"}").await
}

async fn stream_category<W>(
    name: &str,
    cat: &Category,
    first: bool,
    sink: &mut W,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let header = format!(
        "{}{}:{{",
        if first { "" } else { "," },
        serde_json::to_string(name).map_err(encode_err)?
    );
    sink.write_all(header.as_bytes()).await?;
    for (i, (item, col)) in cat.items().enumerate() {
        let key = serde_json::to_string(item).map_err(encode_err)?;
        sink.write_all(format!("{}{}:", if i == 0 { "" } else { "," }, key).as_bytes())
            .await?;
        let body = serde_json::to_string(col).map_err(encode_err)?;
        sink.write_all(body.as_bytes()).await?;
    }
    sink.write_all(b"}").await
}
