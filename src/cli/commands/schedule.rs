//! Schedule command implementation
//!
//! Starts the daily sync scheduler and keeps it running until SIGINT or
//! SIGTERM.

use super::{load_or_report, stores_or_report, EXIT_CONFIG, EXIT_OK};
use crate::adapters::registry::RegistryClient;
use crate::core::scheduler::{DailySchedule, Scheduler};
use crate::core::sync::SyncJob;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the schedule command
#[derive(Args, Debug)]
pub struct ScheduleArgs {}

impl ScheduleArgs {
    /// Execute the schedule command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if !config.scheduler.enabled {
            eprintln!("❌ Scheduler is disabled (scheduler.enabled = false)");
            return Ok(EXIT_CONFIG);
        }

        let schedule = match DailySchedule::from_config(&config.scheduler) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };
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

        let job = Arc::new(SyncJob::new(
            registry,
            stores.hospitals.clone(),
            config.application.dry_run,
        ));
        let scheduler = Scheduler::new(job, schedule);
        scheduler.start();

        if let Some(next) = scheduler.next_run() {
            println!("⏰ Scheduler running; next sync at {next}");
        }

        while !*shutdown_signal.borrow() {
            if shutdown_signal.changed().await.is_err() {
                break;
            }
        }

        println!("Stopping scheduler...");
        scheduler.stop().await;
        Ok(EXIT_OK)
    }
}
