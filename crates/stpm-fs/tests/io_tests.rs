use std::fs;

use stpm_fs::{ConfigStore, Error, NormalizedPath, RobustnessConfig, io};
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("assets/theme.js"));

    io::write_atomic(&path, b"console.log(1)", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "console.log(1)");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("theme.css");
    fs::write(&file_path, "original").unwrap();

    let path = NormalizedPath::new(&file_path);
    io::write_text(&path, "updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_read_text_missing_is_not_found() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("nope.txt"));

    let err = io::read_text(&path).unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
}

#[test]
fn test_copy_file_preserves_bytes() {
    let temp = TempDir::new().unwrap();
    let source = NormalizedPath::new(temp.path().join("pkg/snippets/card.liquid"));
    fs::create_dir_all(temp.path().join("pkg/snippets")).unwrap();
    fs::write(source.to_native(), "{% doc %}@snippet card{% enddoc %}").unwrap();

    let destination = NormalizedPath::new(temp.path().join("theme/snippets/card.liquid"));
    io::copy_file(&source, &destination).unwrap();

    assert_eq!(
        fs::read_to_string(destination.to_native()).unwrap(),
        "{% doc %}@snippet card{% enddoc %}"
    );
}

#[test]
fn test_config_store_json_is_two_space_pretty() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("doc.json"));
    let store = ConfigStore::new();

    store.save(&path, &serde_json::json!({"a": {"b": 1}})).unwrap();

    let raw = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(raw, "{\n  \"a\": {\n    \"b\": 1\n  }\n}\n");
}

#[test]
fn test_config_store_rejects_unknown_extension() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("doc.ini"));
    fs::write(path.to_native(), "a=1").unwrap();

    let result: stpm_fs::Result<serde_json::Value> = ConfigStore::new().load(&path);
    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
}

#[test]
fn test_config_store_reports_parse_errors() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("broken.json"));
    fs::write(path.to_native(), "{ not json").unwrap();

    let result: stpm_fs::Result<serde_json::Value> = ConfigStore::new().load(&path);
    assert!(matches!(result, Err(Error::ConfigParse { ref format, .. }) if format == "JSON"));
}
