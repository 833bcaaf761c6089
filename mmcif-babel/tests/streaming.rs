//! Streaming emitters produce the same bytes as their buffered
//! counterparts, chunk by chunk, against an in-memory async sink.

use mmcif_babel::formats::{cif, mmjson};
use mmcif_parser::cif::parse;

const INPUT: &str = "\
data_demo
_cell.length_a 50.000
_symmetry.space_group 'P 1'
loop_
_atom.id
_atom.name
1 N
2 CA
data_second
_entry.id demo2
";

#[tokio::test]
async fn streamed_cif_matches_buffered_output() {
    let doc = parse(INPUT).unwrap();
    let settings = cif::WriteSettings::default();
    let buffered = cif::serialize(&doc, &settings);

    let mut sink: Vec<u8> = Vec::new();
    cif::stream(&doc, &settings, &mut sink).await.unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), buffered);
}

#[tokio::test]
async fn streamed_cif_honors_settings() {
    let doc = parse(INPUT).unwrap();
    let settings = cif::WriteSettings {
        omit_hash: true,
        force_loop: true,
        split_loop: Some("SPLIT".into()),
    };
    let buffered = cif::serialize(&doc, &settings);

    let mut sink: Vec<u8> = Vec::new();
    cif::stream(&doc, &settings, &mut sink).await.unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), buffered);
}

#[tokio::test]
async fn streamed_mmjson_matches_buffered_output() {
    let doc = parse(INPUT).unwrap();
    let buffered = serde_json::to_string(&mmjson::to_value(&doc)).unwrap();

    let mut sink: Vec<u8> = Vec::new();
    mmjson::stream(&doc, &mut sink).await.unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), buffered);
}

#[tokio::test]
async fn streamed_mmjson_is_valid_json_with_block_order() {
    let doc = parse(INPUT).unwrap();
    let mut sink: Vec<u8> = Vec::new();
    mmjson::stream(&doc, &mut sink).await.unwrap();

    let text = String::from_utf8(sink).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["data_demo"]["atom"]["name"], serde_json::json!(["N", "CA"]));
    assert!(text.find("data_demo").unwrap() < text.find("data_second").unwrap());
}

#[tokio::test]
async fn streamed_mmjson_handles_frames_and_global_scope() {
    let input = "_g.h 1\ndata_dict\nsave__cell.length_a\n_item_type.code float\nsave_\n";
    let doc = parse(input).unwrap();
    let mut sink: Vec<u8> = Vec::new();
    mmjson::stream(&doc, &mut sink).await.unwrap();

    let buffered = serde_json::to_string(&mmjson::to_value(&doc)).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), buffered);
}
