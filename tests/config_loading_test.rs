//! Config document loading tests.

use database_mcp::config::{Config, build_registry};
use database_mcp::models::Dialect;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_registry_from_file_path() {
    let file = write_config(
        r#"{
            "databases": {
                "dev": {
                    "type": "mysql",
                    "host": "db.internal",
                    "user": "app",
                    "password": "secret",
                    "database": "dev_db"
                },
                "stage": {
                    "type": "postgresql",
                    "port": 5433,
                    "user": "app",
                    "database": "stage_db",
                    "description": "staging replica"
                }
            }
        }"#,
    );

    let config = Config {
        config: Some(file.path().to_path_buf()),
        ..Config::default()
    };
    let registry = config.load_registry().unwrap();

    assert_eq!(registry.len(), 2);
    let names: Vec<&str> = registry.list().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["dev", "stage"]);

    let dev = registry.resolve("dev").unwrap();
    assert_eq!(dev.dialect, Dialect::MySql);
    assert_eq!(dev.port, 3306);
    assert_eq!(dev.host, "db.internal");

    let stage = registry.resolve("stage").unwrap();
    assert_eq!(stage.dialect, Dialect::Postgres);
    assert_eq!(stage.port, 5433);
}

#[test]
fn missing_file_is_a_config_error() {
    let config = Config {
        config: Some("/nonexistent/config.json".into()),
        ..Config::default()
    };
    let err = config.load_registry().unwrap_err();
    assert!(err.to_string().starts_with("Configuration error:"));
    assert!(err.to_string().contains("/nonexistent/config.json"));
}

#[test]
fn no_config_source_yields_empty_registry() {
    let config = Config::default();
    let registry = config.load_registry().unwrap();
    assert!(registry.is_empty());
}

#[test]
fn duplicate_name_last_write_wins_keeps_position() {
    // JSON objects cannot carry duplicate keys through serde, so exercise
    // replacement through the registry itself.
    let json = r#"{
        "databases": {
            "a": {"type": "mysql", "user": "u", "database": "one"},
            "b": {"type": "mysql", "user": "u", "database": "two"}
        }
    }"#;
    let mut registry = build_registry(json, "test").unwrap();

    let replacement = build_registry(
        r#"{"databases": {"a": {"type": "postgres", "user": "u", "database": "three"}}}"#,
        "test",
    )
    .unwrap();
    let config = replacement.resolve("a").unwrap().clone();
    registry.register(config);

    let names: Vec<&str> = registry.list().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(registry.resolve("a").unwrap().database, "three");
}

#[test]
fn entry_missing_required_field_is_rejected() {
    let json = r#"{
        "databases": {
            "bad": {"type": "mysql", "database": "d"}
        }
    }"#;
    let err = build_registry(json, "test").unwrap_err();
    assert!(err.to_string().contains("bad"));
}

#[test]
fn debug_output_masks_password() {
    let json = r#"{
        "databases": {
            "dev": {"type": "mysql", "user": "app", "password": "hunter2", "database": "d"}
        }
    }"#;
    let registry = build_registry(json, "test").unwrap();
    let rendered = format!("{:?}", registry.resolve("dev").unwrap());
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("***"));
}
