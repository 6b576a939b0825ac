//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;

use oslink_domain::AgentConfig;
use oslink_infra::config;
use oslink_infra::sync::SyncAgentConfig;

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "legacy": {
            "db_path": "C:\\SHARMAQ\\SHOficina\\dados.mdb",
            "password": "segredo",
            "query_timeout_secs": 20
        },
        "sync": {
            "poll_interval_ms": 2500,
            "request_timeout_secs": 4,
            "queue_path": "/var/lib/oslink/pending_orders.json"
        }
    }"#;

    let mut temp_file =
        tempfile::Builder::new().suffix(".json").tempfile().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.legacy.db_path, PathBuf::from(r"C:\SHARMAQ\SHOficina\dados.mdb"));
    assert_eq!(config.legacy.password.as_deref(), Some("segredo"));
    assert_eq!(config.legacy.query_timeout().as_secs(), 20);
    assert_eq!(config.sync.poll_interval().as_millis(), 2500);
    assert_eq!(config.sync.request_timeout().as_secs(), 4);
    assert_eq!(config.sync.queue_path, PathBuf::from("/var/lib/oslink/pending_orders.json"));

    let agent = SyncAgentConfig::from(&config.sync);
    assert_eq!(agent.poll_interval.as_millis(), 2500);
}

#[test]
fn test_load_config_from_toml_file() {
    let toml_content = r#"
[legacy]
db_path = 'D:\dados.mdb'

[sync]
request_timeout_secs = 12
"#;

    let mut temp_file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");
    temp_file.write_all(toml_content.as_bytes()).expect("Failed to write to temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    let defaults = AgentConfig::default();
    assert_eq!(config.legacy.db_path, PathBuf::from(r"D:\dados.mdb"));
    assert_eq!(config.legacy.password, None);
    assert_eq!(config.legacy.query_timeout_secs, defaults.legacy.query_timeout_secs);
    assert_eq!(config.sync.request_timeout_secs, 12);
    assert_eq!(config.sync.poll_interval_ms, defaults.sync.poll_interval_ms);
}

#[test]
fn test_empty_file_is_all_defaults() {
    let temp_file =
        tempfile::Builder::new().suffix(".toml").tempfile().expect("Failed to create temp file");

    let config = config::load_from_file(Some(temp_file.path().to_path_buf()))
        .expect("Empty TOML is a valid config");
    assert_eq!(config, AgentConfig::default());
}

#[test]
fn test_debug_output_hides_password() {
    let mut config = AgentConfig::default();
    config.legacy.password = Some("!(&&!!)&".into());

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("!(&&!!)&"));
    assert!(rendered.contains("<redacted>"));
}
