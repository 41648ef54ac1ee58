// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use buildagent::config::{AgentConfig, load_and_validate, load_for_cli};
use buildagent::errors::AgentError;
use tempfile::NamedTempFile;

#[test]
fn full_config_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[agent]
freeze_poll_interval = "250ms"
inherit_environment = false

[store]
path = "/var/lib/buildagent/store.json"

[sources]
workspace = "/var/lib/buildagent/src"
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.freeze_poll_interval, Duration::from_millis(250));
    assert!(!cfg.inherit_environment);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/buildagent/store.json"));
    assert_eq!(cfg.sources_workspace, PathBuf::from("/var/lib/buildagent/src"));
}

#[test]
fn omitted_sections_fall_back_to_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[agent]\ninherit_environment = true\n").unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    let defaults = AgentConfig::default();

    assert_eq!(cfg.freeze_poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.store_path, defaults.store_path);
    assert_eq!(cfg.sources_workspace, defaults.sources_workspace);
}

#[test]
fn zero_poll_interval_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[agent]\nfreeze_poll_interval = \"0s\"\n").unwrap();

    match load_and_validate(file.path()) {
        Err(AgentError::ConfigError(msg)) => assert!(msg.contains("freeze_poll_interval")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn malformed_duration_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[agent]\nfreeze_poll_interval = \"soon\"\n").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AgentError::ConfigError(_))
    ));
}

#[test]
fn invalid_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[agent\nfreeze_poll_interval = ").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AgentError::TomlError(_))
    ));
}

#[test]
fn explicit_missing_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("Agent.toml");

    assert!(matches!(
        load_for_cli(Some(&missing)),
        Err(AgentError::IoError(_))
    ));
}
