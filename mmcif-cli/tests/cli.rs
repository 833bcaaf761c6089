//! CLI integration tests: single-file conversions through the real binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn converts_cif_to_mmjson_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "demo.cif", "data_demo\n_cell.length_a 50.0\n");

    Command::cargo_bin("mmcif")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "{\"data_demo\":{\"cell\":{\"length_a\":[\"50.0\"]}}}",
        ));
}

#[test]
fn reserializes_cif_to_cif() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "demo.cif",
        "data_demo\nloop_\n_atom.id\n_atom.name\n1 N\n2 CA\n",
    );

    Command::cargo_bin("mmcif")
        .unwrap()
        .args([&input, "--to", "cif"])
        .assert()
        .success()
        .stdout(predicate::str::contains("loop_\n_atom.id\n_atom.name\n"));
}

#[test]
fn ingests_pdbml_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        &dir,
        "demo.xml",
        r#"<datablock datablockName="1X"><cellCategory><cell length_a="50.0"/></cellCategory></datablock>"#,
    );

    Command::cargo_bin("mmcif")
        .unwrap()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"data_1X\""));
}

#[test]
fn dictionary_types_values() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "demo.cif", "data_demo\n_cell.length_a 50.5\n");
    let dict = write_fixture(&dir, "dict.json", r#"{"cell": {"length_a": "float"}}"#);

    Command::cargo_bin("mmcif")
        .unwrap()
        .args([&input, "--dict", &dict])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"length_a\":[50.5]"));
}

#[test]
fn grammar_errors_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "bad.cif", "stray value before any tag\n");

    Command::cargo_bin("mmcif")
        .unwrap()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 0"));
}

#[test]
fn missing_input_file_fails() {
    Command::cargo_bin("mmcif")
        .unwrap()
        .arg("no-such-file.cif")
        .assert()
        .failure();
}

#[test]
fn writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(&dir, "demo.cif", "data_demo\n_a.b 1\n");
    let out = dir.path().join("out.json");

    Command::cargo_bin("mmcif")
        .unwrap()
        .args([&input, "-o", out.to_str().unwrap()])
        .assert()
        .success();

    let written = std::fs::read_to_string(&out).unwrap();
    assert!(written.contains("\"data_demo\""));
}
