use kiln_fs::{ConfigStore, Error, NormalizedPath};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct TestConfig {
    name: String,
    count: i32,
}

#[test]
fn test_load_toml() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("kiln.config.toml");
    fs::write(&file_path, "name = \"test\"\ncount = 42").unwrap();

    let store = ConfigStore::new();
    let config: TestConfig = store.load(&NormalizedPath::new(&file_path)).unwrap();

    assert_eq!(config.name, "test");
    assert_eq!(config.count, 42);
}

#[test]
fn test_load_yaml_as_value() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("kiln.config.yaml");
    fs::write(&file_path, "compilation:\n  minify: true\n").unwrap();

    let value = ConfigStore::new()
        .load_value(&NormalizedPath::new(&file_path))
        .unwrap();

    assert_eq!(value, json!({ "compilation": { "minify": true } }));
}

#[test]
fn test_load_json_parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("kiln.config.json");
    fs::write(&file_path, "{ not json").unwrap();

    let err = ConfigStore::new()
        .load_value(&NormalizedPath::new(&file_path))
        .unwrap_err();

    match err {
        Error::ConfigParse { format, .. } => assert_eq!(format, "JSON"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unsupported_extension() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("kiln.config.ts");
    fs::write(&file_path, "export default {}").unwrap();

    let path = NormalizedPath::new(&file_path);
    assert!(!ConfigStore::supports(&path));
    assert!(matches!(
        ConfigStore::new().load_value(&path),
        Err(Error::UnsupportedFormat { .. })
    ));
}
