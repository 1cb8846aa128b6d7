//! Sync command implementation
//!
//! Runs one fetch-and-reconcile pass and prints the report.

use super::{load_or_report, stores_or_report, EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_OK};
use crate::adapters::registry::RegistryClient;
use crate::core::sync::{SyncJob, SyncOutcome, SyncSummary};
use crate::domain::PurgoError;
use clap::Args;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Compute the report without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let dry_run = self.dry_run || config.application.dry_run;
        if dry_run {
            println!("🔍 DRY RUN MODE - No data will be written to the database");
            println!();
        }

        let registry = match RegistryClient::from_config(&config.registry) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Failed to create registry client: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let stores = match stores_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let job = SyncJob::new(registry, stores.hospitals.clone(), dry_run);

        println!("🚀 Fetching hospital registry...");
        match job.run("cli").await {
            Ok(SyncOutcome::Completed(summary)) => {
                print_summary(&summary);
                Ok(EXIT_OK)
            }
            Ok(SyncOutcome::Skipped) => {
                println!("⚠️  A sync is already running");
                Ok(EXIT_OK)
            }
            Err(e) => {
                eprintln!("❌ Sync failed: {e}");
                Ok(exit_code_for(&e))
            }
        }
    }
}

fn exit_code_for(error: &PurgoError) -> i32 {
    match error {
        PurgoError::Registry(e) if e.is_network() => EXIT_CONNECTION,
        PurgoError::Database(_) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

fn print_summary(summary: &SyncSummary) {
    let report = &summary.report;
    println!();
    println!("📊 Sync Summary:");
    println!("  Records fetched: {}", summary.records_fetched);
    println!("  Created: {}", report.created);
    println!("  Updated: {}", report.updated);
    println!("  Unchanged: {}", report.unchanged);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    if !report.field_changes.is_empty() {
        println!("  Changed fields:");
        for (field, count) in &report.field_changes {
            println!("    {field}: {count}");
        }
    }
    println!();
    if report.dry_run {
        println!("✅ Dry run completed; nothing was written");
    } else {
        println!("✅ Sync completed successfully!");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistryError;

    #[test]
    fn test_exit_codes() {
        let timeout = PurgoError::Registry(RegistryError::Timeout { page: 3, seconds: 30 });
        assert_eq!(exit_code_for(&timeout), EXIT_CONNECTION);

        let parse = PurgoError::Registry(RegistryError::Parse {
            page: 1,
            message: "bad".to_string(),
        });
        assert_eq!(exit_code_for(&parse), EXIT_FATAL);
    }
}
