//! CLI command implementations
//!
//! Every command returns the process exit code:
//! 0 success, 2 configuration error, 4 connection error, 5 fatal error.

pub mod init;
pub mod schedule;
pub mod sync;
pub mod validate;

use crate::adapters::database::{create_stores, Stores};
use crate::config::{load_config, PurgoConfig};

pub const EXIT_OK: i32 = 0;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Load configuration or report why not
fn load_or_report(config_path: &str) -> Result<PurgoConfig, i32> {
    load_config(config_path).map_err(|e| {
        tracing::error!(error = %e, config_path, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration: {e}");
        EXIT_CONFIG
    })
}

/// Open the configured stores or report why not
async fn stores_or_report(config: &PurgoConfig) -> Result<Stores, i32> {
    create_stores(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize database");
        eprintln!("❌ Failed to initialize database: {e}");
        EXIT_CONNECTION
    })
}
