//! Integration tests for logging initialization
//!
//! The global subscriber can only be installed once per process, so this
//! binary holds a single initializing test.

use purgo::config::LoggingConfig;
use purgo::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_file_logging_creates_directory_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("nested").join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "daily".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(records = 3, "sync finished");
    drop(guard);

    assert!(log_path.is_dir());
    let files: Vec<String> = std::fs::read_dir(&log_path)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    assert!(
        files.iter().any(|name| name.starts_with("purgo.log")),
        "no log file in {files:?}"
    );
}

#[test]
fn test_unknown_level_is_rejected_before_install() {
    let config = LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    };
    assert!(init_logging("chatty", &config).is_err());
}
