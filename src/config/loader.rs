//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{DatabaseTarget, PurgoConfig};
use super::secret::secret_string;
use crate::domain::errors::PurgoError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Environment variable holding the registry service key
pub const API_KEY_ENV: &str = "HOSPITAL_API_KEY";

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PurgoConfig
/// 4. Applies environment variable overrides (PURGO_* prefix, HOSPITAL_API_KEY)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a referenced
/// environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use purgo::config::loader::load_config;
///
/// let config = load_config("purgo.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<PurgoConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PurgoError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PurgoError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    load_config_from_str(&contents)
}

/// Same as [`load_config`] for an in-memory document
pub fn load_config_from_str(contents: &str) -> Result<PurgoConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: PurgoConfig = toml::from_str(&contents)
        .map_err(|e| PurgoError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        PurgoError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| PurgoError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(PurgoError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides
///
/// Variables follow the pattern `PURGO_<SECTION>_<KEY>`, e.g.
/// `PURGO_REGISTRY_TIMEOUT_SECONDS`. The registry key can also come from
/// `HOSPITAL_API_KEY`, which wins over everything else.
fn apply_env_overrides(config: &mut PurgoConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PURGO_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("PURGO_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Registry overrides
    if let Ok(val) = std::env::var("PURGO_REGISTRY_BASE_URL") {
        config.registry.base_url = val;
    }
    if let Ok(val) = std::env::var("PURGO_REGISTRY_TIMEOUT_SECONDS") {
        config.registry.timeout_seconds = parse_override("PURGO_REGISTRY_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("PURGO_REGISTRY_MAX_PAGES") {
        config.registry.max_pages = parse_override("PURGO_REGISTRY_MAX_PAGES", &val)?;
    }
    if let Ok(val) = std::env::var(API_KEY_ENV) {
        config.registry.api_key = Some(secret_string(val));
    }

    // Scheduler overrides
    if let Ok(val) = std::env::var("PURGO_SCHEDULER_CRON") {
        config.scheduler.cron = val;
    }
    if let Ok(val) = std::env::var("PURGO_SCHEDULER_TIMEZONE") {
        config.scheduler.timezone = Some(val);
    }

    // Database overrides
    if let Ok(val) = std::env::var("PURGO_DATABASE_TARGET") {
        config.database.target = match val.to_lowercase().as_str() {
            "postgresql" => DatabaseTarget::PostgreSQL,
            "memory" => DatabaseTarget::Memory,
            other => {
                return Err(PurgoError::Configuration(format!(
                    "PURGO_DATABASE_TARGET must be 'postgresql' or 'memory', got '{other}'"
                )))
            }
        };
    }
    if let Some(ref mut pg_config) = config.postgresql {
        if let Ok(val) = std::env::var("PURGO_POSTGRESQL_CONNECTION_STRING") {
            pg_config.connection_string = secret_string(val);
        }
        if let Ok(val) = std::env::var("PURGO_POSTGRESQL_MAX_CONNECTIONS") {
            pg_config.max_connections = parse_override("PURGO_POSTGRESQL_MAX_CONNECTIONS", &val)?;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PURGO_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("PURGO_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| PurgoError::Configuration(format!("{name} has an invalid value: {value}")))
}
