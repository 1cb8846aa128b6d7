//! Daily sync scheduler
//!
//! Runs the [`SyncJob`] on a background tokio task at the times given by a
//! cron expression, in the local timezone unless an IANA zone is
//! configured. Failures are logged and the next tick is the retry.

use crate::config::SchedulerConfig;
use crate::core::sync::{SyncJob, SyncOutcome};
use crate::domain::{PurgoError, Result};
use chrono::{DateTime, Local, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cron expression bound to a timezone
#[derive(Debug, Clone)]
pub struct DailySchedule {
    schedule: Schedule,
    timezone: Option<Tz>,
}

impl DailySchedule {
    /// Parse a six-field cron expression and an optional IANA timezone
    ///
    /// # Errors
    ///
    /// Returns a scheduler error for an invalid expression or zone.
    pub fn new(expression: &str, timezone: Option<&str>) -> Result<Self> {
        let schedule = Schedule::from_str(expression).map_err(|e| {
            PurgoError::Scheduler(format!("Invalid cron expression '{expression}': {e}"))
        })?;
        let timezone = timezone
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|e| PurgoError::Scheduler(format!("Invalid timezone '{name}': {e}")))
            })
            .transpose()?;
        Ok(Self { schedule, timezone })
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        Self::new(&config.cron, config.timezone.as_deref())
    }

    /// First fire time strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.timezone {
            Some(tz) => self
                .schedule
                .after(&now.with_timezone(&tz))
                .next()
                .map(|t| t.with_timezone(&Utc)),
            None => self
                .schedule
                .after(&now.with_timezone(&Local))
                .next()
                .map(|t| t.with_timezone(&Utc)),
        }
    }

    /// Label for logs
    pub fn timezone_name(&self) -> String {
        self.timezone
            .map(|tz| tz.name().to_string())
            .unwrap_or_else(|| "local".to_string())
    }
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Background timer driving a [`SyncJob`]
pub struct Scheduler {
    job: Arc<SyncJob>,
    schedule: DailySchedule,
    running: Mutex<Option<Running>>,
}

impl Scheduler {
    pub fn new(job: Arc<SyncJob>, schedule: DailySchedule) -> Self {
        Self {
            job,
            schedule,
            running: Mutex::new(None),
        }
    }

    /// Start the timer task
    ///
    /// Returns `false` without doing anything if it is already running.
    /// Must be called inside a tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.lock_running();
        if running.as_ref().is_some_and(|r| !r.task.is_finished()) {
            tracing::debug!("Scheduler already running");
            return false;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            self.job.clone(),
            self.schedule.clone(),
            shutdown_rx,
        ));
        *running = Some(Running { shutdown, task });

        tracing::info!(timezone = %self.schedule.timezone_name(), "Scheduler started");
        true
    }

    /// Signal the timer task and wait for it to exit
    ///
    /// A sync in progress is allowed to finish first. Returns `false` if
    /// the scheduler was not running.
    pub async fn stop(&self) -> bool {
        let Some(running) = self.lock_running().take() else {
            return false;
        };

        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            tracing::error!(error = %e, "Scheduler task ended abnormally");
        }
        tracing::info!("Scheduler stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock_running()
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Next fire time from now
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.schedule.next_after(Utc::now())
    }

    fn lock_running(&self) -> std::sync::MutexGuard<'_, Option<Running>> {
        self.running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

async fn run_loop(job: Arc<SyncJob>, schedule: DailySchedule, mut shutdown: watch::Receiver<bool>) {
    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            tracing::warn!("Cron expression has no upcoming fire time; scheduler exiting");
            return;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::debug!(next_run = %next, "Waiting for next scheduled sync");

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                match job.run("scheduler").await {
                    Ok(SyncOutcome::Completed(summary)) => {
                        tracing::info!(
                            fetched = summary.records_fetched,
                            created = summary.report.created,
                            updated = summary.report.updated,
                            "Scheduled sync finished"
                        );
                    }
                    Ok(SyncOutcome::Skipped) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Scheduled sync failed; will retry at next tick");
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}
