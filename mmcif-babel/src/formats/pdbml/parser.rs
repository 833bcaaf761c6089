//! PDBML ingestor: event-driven XML front end for the shared data model.
//!
//! PDBML is flat: a root element carrying a `datablockName` attribute,
//! first-level children named `<category>Category`, row elements beneath,
//! and items as row attributes or child-element text. Rows are ingested
//! one at a time; after each row every column the row did not touch is
//! padded with null, and a column first seen on a later row is back-filled
//! with nulls for the rows before it. No `?`/`.` normalization happens
//! here — the type normalizer runs afterward exactly as for text-origin
//! documents.

use mmcif_parser::cif::{Category, Document, Value};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;

/// Errors raised while ingesting a PDBML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdbmlError {
    /// XML syntax or encoding failure.
    Xml(String),
    /// The root element has no `datablockName` attribute.
    MissingBlockName,
}

impl fmt::Display for PdbmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdbmlError::Xml(msg) => write!(f, "malformed PDBML: {}", msg),
            PdbmlError::MissingBlockName => {
                write!(f, "root element has no datablockName attribute")
            }
        }
    }
}

impl std::error::Error for PdbmlError {}

fn xml_err<E: fmt::Display>(e: E) -> PdbmlError {
    PdbmlError::Xml(e.to_string())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// `<cellCategory>` → `cell`.
fn category_name(e: &BytesStart<'_>) -> String {
    let name = local_name(e);
    name.strip_suffix("Category").unwrap_or(&name).to_string()
}

fn push_cell(cat: &mut Category, item: &str, row: usize, value: Value) {
    let col = cat.column_mut(item);
    // a column first seen on row n owes nulls for the rows before it
    while col.len() < row {
        col.push(Value::Null);
    }
    col.push(value);
}

/// Parse a PDBML document into a [`Document`].
pub fn parse(xml: &str) -> Result<Document, PdbmlError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut doc = Document::new();
    let mut depth: usize = 0;
    let mut block_idx: Option<usize> = None;
    let mut category: Option<String> = None;
    let mut row: usize = 0;
    let mut item: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) => {
                depth += 1;
                match depth {
                    1 => block_idx = Some(open_root(&mut doc, &e)?),
                    2 => {
                        let name = category_name(&e);
                        if let Some(bidx) = block_idx {
                            doc.block_at_mut(bidx).category_mut(&name);
                        }
                        category = Some(name);
                        row = 0;
                    }
                    3 => row_attributes(&mut doc, block_idx, &category, row, &e)?,
                    4 => {
                        item = Some(local_name(&e));
                        text.clear();
                    }
                    // deeper elements contribute their text to the open item
                    _ => {}
                }
            }
            Event::Empty(e) => match depth + 1 {
                1 => {
                    block_idx = Some(open_root(&mut doc, &e)?);
                    break;
                }
                2 => {
                    if let Some(bidx) = block_idx {
                        doc.block_at_mut(bidx).category_mut(&category_name(&e));
                    }
                }
                3 => {
                    // attribute-only row
                    row_attributes(&mut doc, block_idx, &category, row, &e)?;
                    close_row(&mut doc, block_idx, &category, &mut row);
                }
                4 => {
                    if let (Some(bidx), Some(cat_name)) = (block_idx, category.as_deref()) {
                        let cat = doc.block_at_mut(bidx).category_mut(cat_name);
                        push_cell(cat, &local_name(&e), row, Value::Str(String::new()));
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if depth >= 4 && item.is_some() {
                    text.push_str(&t.unescape().map_err(xml_err)?);
                }
            }
            Event::CData(t) => {
                if depth >= 4 && item.is_some() {
                    text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::End(_) => {
                match depth {
                    4 => {
                        if let (Some(bidx), Some(cat_name), Some(item_name)) =
                            (block_idx, category.as_deref(), item.take())
                        {
                            let cat = doc.block_at_mut(bidx).category_mut(cat_name);
                            push_cell(cat, &item_name, row, Value::Str(std::mem::take(&mut text)));
                        }
                    }
                    3 => close_row(&mut doc, block_idx, &category, &mut row),
                    2 => category = None,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if block_idx.is_none() {
        return Err(PdbmlError::MissingBlockName);
    }
    Ok(doc)
}

/// Reads the root's `datablockName` attribute and opens the block.
fn open_root(doc: &mut Document, e: &BytesStart<'_>) -> Result<usize, PdbmlError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.local_name().as_ref() == b"datablockName" {
            let name = attr.unescape_value().map_err(xml_err)?;
            return Ok(doc.block_index_mut(&name));
        }
    }
    Err(PdbmlError::MissingBlockName)
}

/// Ingests one row element's attributes as item values.
fn row_attributes(
    doc: &mut Document,
    block_idx: Option<usize>,
    category: &Option<String>,
    row: usize,
    e: &BytesStart<'_>,
) -> Result<(), PdbmlError> {
    let (Some(bidx), Some(cat_name)) = (block_idx, category.as_deref()) else {
        return Ok(());
    };
    let cat = doc.block_at_mut(bidx).category_mut(cat_name);
    for attr in e.attributes() {
        let attr = attr.map_err(xml_err)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr.unescape_value().map_err(xml_err)?.to_string();
        push_cell(cat, &key, row, Value::Str(value));
    }
    Ok(())
}

/// Closes a row: pads every column the row did not touch with null.
fn close_row(doc: &mut Document, block_idx: Option<usize>, category: &Option<String>, row: &mut usize) {
    if let (Some(bidx), Some(cat_name)) = (block_idx, category.as_deref()) {
        doc.block_at_mut(bidx).category_mut(cat_name).pad_to(*row + 1);
    }
    *row += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"<?xml version="1.0"?>
<datablock datablockName="1ABC">
  <cellCategory>
    <cell length_a="50.0" length_b="60.0">
      <length_c>70.0</length_c>
    </cell>
  </cellCategory>
  <atom_siteCategory>
    <atom_site id="1" type_symbol="N">
      <Cartn_x>10.0</Cartn_x>
    </atom_site>
    <atom_site id="2">
      <Cartn_x>11.0</Cartn_x>
    </atom_site>
  </atom_siteCategory>
</datablock>
"#;

    #[test]
    fn block_name_comes_from_root_attribute() {
        let doc = parse(SMALL).unwrap();
        assert!(doc.block("1ABC").is_some());
    }

    #[test]
    fn attributes_and_child_elements_populate_columns() {
        let doc = parse(SMALL).unwrap();
        let cell = doc.block("1ABC").unwrap().category("cell").unwrap();
        assert_eq!(cell.get("length_a").unwrap()[0], Value::Str("50.0".into()));
        assert_eq!(cell.get("length_c").unwrap()[0], Value::Str("70.0".into()));
    }

    #[test]
    fn ragged_row_is_null_padded() {
        let doc = parse(SMALL).unwrap();
        let atoms = doc.block("1ABC").unwrap().category("atom_site").unwrap();
        assert_eq!(
            atoms.get("type_symbol").unwrap(),
            &vec![Value::Str("N".into()), Value::Null]
        );
        assert_eq!(
            atoms.get("id").unwrap(),
            &vec![Value::Str("1".into()), Value::Str("2".into())]
        );
    }

    #[test]
    fn late_column_is_backfilled_with_nulls() {
        let xml = r#"<datablock datablockName="d">
  <cCategory>
    <c a="1"/>
    <c a="2" b="x"/>
  </cCategory>
</datablock>"#;
        let doc = parse(xml).unwrap();
        let cat = doc.block("d").unwrap().category("c").unwrap();
        assert_eq!(cat.get("b").unwrap(), &vec![Value::Null, Value::Str("x".into())]);
    }

    #[test]
    fn null_sentinels_are_not_normalized_here() {
        let xml = r#"<datablock datablockName="d">
  <cCategory><c a="?"/></cCategory>
</datablock>"#;
        let doc = parse(xml).unwrap();
        let cat = doc.block("d").unwrap().category("c").unwrap();
        assert_eq!(cat.get("a").unwrap()[0], Value::Str("?".into()));
    }

    #[test]
    fn missing_datablock_name_is_an_error() {
        let err = parse("<datablock><cCategory/></datablock>").unwrap_err();
        assert_eq!(err, PdbmlError::MissingBlockName);
    }

    #[test]
    fn namespaced_elements_use_local_names() {
        let xml = r#"<PDBx:datablock xmlns:PDBx="http://pdbml.pdb.org/schema" datablockName="d">
  <PDBx:entryCategory>
    <PDBx:entry id="d"/>
  </PDBx:entryCategory>
</PDBx:datablock>"#;
        let doc = parse(xml).unwrap();
        let entry = doc.block("d").unwrap().category("entry").unwrap();
        assert_eq!(entry.get("id").unwrap()[0], Value::Str("d".into()));
    }

    #[test]
    fn malformed_xml_is_an_xml_error() {
        let err = parse("<datablock datablockName='d'><broken").unwrap_err();
        assert!(matches!(err, PdbmlError::Xml(_)));
    }
}
