use std::fs;

use lab_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_previous_results() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("results.json", b"[]").unwrap();
    assert_eq!(first.file_name().unwrap(), "results.json");
    assert_eq!(fs::read_to_string(&first).unwrap(), "[]");

    let second = writer.write("results.json", b"[[1.0,0,\"\"]]").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "[[1.0,0,\"\"]]");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("results.json", b"[]");
    assert!(matches!(result, Err(PersistError::OutputDir { .. })));
    assert!(!file_path.with_file_name("results.json").exists());
}

#[test]
fn json_values_are_written_compactly() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("nested"));

    let path = writer.write_json("triples.json", &[(1.5, 0, "")]).unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), r#"[[1.5,0,""]]"#);
}
