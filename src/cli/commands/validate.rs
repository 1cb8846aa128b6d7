//! Validate config command implementation
//!
//! Loads and validates the configuration file and prints a summary with
//! secrets masked.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::adapters::postgresql::client::redact_connection_string;
use crate::config::load_config;
use crate::config::schema::DatabaseTarget;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Registry URL: {}", config.registry.base_url);
        println!(
            "  Registry API Key: {}",
            config
                .registry
                .api_key
                .as_ref()
                .map(|k| k.expose_secret().masked())
                .unwrap_or_else(|| "(unset)".to_string())
        );
        println!(
            "  Pages: {} x {} rows",
            config.registry.max_pages, config.registry.page_size
        );
        println!("  Class Codes: {:?}", config.registry.allowed_class_codes);
        println!(
            "  Schedule: {} ({}){}",
            config.scheduler.cron,
            config.scheduler.timezone.as_deref().unwrap_or("local time"),
            if config.scheduler.enabled { "" } else { " [disabled]" }
        );

        match config.database.target {
            DatabaseTarget::PostgreSQL => {
                println!("  Database Target: PostgreSQL");
                if let Some(ref pg) = config.postgresql {
                    println!(
                        "  PostgreSQL Connection: {}",
                        redact_connection_string(pg.connection_string.expose_secret().as_ref())
                    );
                    println!("  Max Connections: {}", pg.max_connections);
                }
            }
            DatabaseTarget::Memory => println!("  Database Target: in-memory"),
        }
        println!();
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let args = ValidateArgs {};
        let code = args.execute("/nonexistent/purgo.toml").await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
