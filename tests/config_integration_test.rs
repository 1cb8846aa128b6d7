//! Configuration loading from files and the process environment

use purgo::config::{load_config, DatabaseTarget, Environment};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Tests in this binary share the process environment
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDES: &[&str] = &[
    "HOSPITAL_API_KEY",
    "PURGO_REGISTRY_MAX_PAGES",
    "PURGO_SCHEDULER_TIMEZONE",
    "PURGO_DATABASE_TARGET",
    "PURGO_APPLICATION_DRY_RUN",
    "PURGO_TEST_PG_URL",
];

fn clear_env() {
    for name in OVERRIDES {
        std::env::remove_var(name);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

const MEMORY_CONFIG: &str = r#"
[registry]
api_key = "file-key"
max_pages = 3

[scheduler]
enabled = true
cron = "0 59 23 * * *"
timezone = "Asia/Seoul"

[database]
target = "memory"
"#;

#[test]
fn test_memory_config_loads() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = write_config(MEMORY_CONFIG);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.database.target, DatabaseTarget::Memory);
    assert_eq!(config.registry.max_pages, 3);
    assert_eq!(
        config.registry.api_key.as_ref().unwrap().expose_secret(),
        "file-key"
    );
    assert_eq!(config.scheduler.timezone.as_deref(), Some("Asia/Seoul"));
    assert!(config.postgresql.is_none());
}

#[test]
fn test_environment_overrides_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    std::env::set_var("HOSPITAL_API_KEY", "env-key");
    std::env::set_var("PURGO_REGISTRY_MAX_PAGES", "7");
    std::env::set_var("PURGO_APPLICATION_DRY_RUN", "true");

    let file = write_config(MEMORY_CONFIG);
    let result = load_config(file.path());
    clear_env();

    let config = result.unwrap();
    assert_eq!(
        config.registry.api_key.as_ref().unwrap().expose_secret(),
        "env-key"
    );
    assert_eq!(config.registry.max_pages, 7);
    assert!(config.application.dry_run);
}

#[test]
fn test_invalid_numeric_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    std::env::set_var("PURGO_REGISTRY_MAX_PAGES", "many");

    let file = write_config(MEMORY_CONFIG);
    let result = load_config(file.path());
    clear_env();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("PURGO_REGISTRY_MAX_PAGES"));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_substitutes_connection_string_from_environment() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    std::env::set_var("PURGO_TEST_PG_URL", "postgresql://app:hunter2@db:5432/purgo");

    let file = write_config(
        r#"
[registry]
api_key = "file-key"

[database]
target = "postgresql"

[postgresql]
connection_string = "${PURGO_TEST_PG_URL}"
"#,
    );
    let result = load_config(file.path());
    clear_env();

    let config = result.unwrap();
    let pg = config.postgresql.unwrap();
    assert_eq!(
        pg.connection_string.expose_secret(),
        "postgresql://app:hunter2@db:5432/purgo"
    );
}

#[test]
fn test_unset_substitution_variable_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = write_config(
        r#"
[registry]
api_key = "${PURGO_TEST_PG_URL}"

[database]
target = "memory"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("PURGO_TEST_PG_URL"));
}

#[test]
fn test_missing_api_key_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = write_config(
        r#"
[database]
target = "memory"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("HOSPITAL_API_KEY"));
}

#[test]
fn test_memory_backend_rejected_in_production() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    clear_env();

    let file = write_config(
        r#"
environment = "production"

[registry]
api_key = "file-key"

[database]
target = "memory"
"#,
    );
    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("not allowed in production"));
}

#[test]
fn test_missing_file_is_a_configuration_error() {
    let err = load_config("/nonexistent/purgo.toml").unwrap_err();
    assert!(err.to_string().contains("not found"));
}
