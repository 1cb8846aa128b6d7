//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Purgo using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Purgo - hospital registry sync for sales teams
#[derive(Parser, Debug)]
#[command(name = "purgo")]
#[command(version, about, long_about = None)]
#[command(author = "Purgo Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "purgo.toml", env = "PURGO_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PURGO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the hospital registry and reconcile it into the database now
    Sync(commands::sync::SyncArgs),

    /// Run the daily sync scheduler until interrupted
    Schedule(commands::schedule::ScheduleArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_sync() {
        let cli = Cli::parse_from(["purgo", "sync"]);
        assert_eq!(cli.config, "purgo.toml");
        assert!(matches!(cli.command, Commands::Sync(ref args) if !args.dry_run));
    }

    #[test]
    fn test_cli_parse_sync_dry_run() {
        let cli = Cli::parse_from(["purgo", "sync", "--dry-run"]);
        assert!(matches!(cli.command, Commands::Sync(ref args) if args.dry_run));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["purgo", "--config", "custom.toml", "schedule"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Schedule(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["purgo", "--log-level", "debug", "sync"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["purgo", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["purgo", "init", "--output", "x.toml", "--force"]);
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.output, "x.toml");
                assert!(args.force);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
