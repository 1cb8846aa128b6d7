//! Sync job: fetch the registry, then reconcile
//!
//! A job owns a single-flight lock. A trigger that arrives while a run is
//! in progress is skipped rather than queued.

use crate::adapters::database::traits::HospitalStore;
use crate::adapters::registry::RegistryClient;
use crate::core::sync::reconciler::Reconciler;
use crate::core::sync::report::ReconcileReport;
use crate::domain::Result;
use crate::{log_error_with_context, log_sync_complete, log_sync_start};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Result of a completed sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// Records kept after class filtering and de-duplication
    pub records_fetched: usize,

    /// What the reconciler did with them
    pub report: ReconcileReport,

    /// Fetch plus reconcile
    pub duration: Duration,
}

/// What happened to a trigger
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    Completed(SyncSummary),
    /// Another run held the lock
    Skipped,
}

impl SyncOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, SyncOutcome::Skipped)
    }

    pub fn summary(&self) -> Option<&SyncSummary> {
        match self {
            SyncOutcome::Completed(summary) => Some(summary),
            SyncOutcome::Skipped => None,
        }
    }
}

/// Fetch-and-reconcile unit shared by the CLI and the scheduler
pub struct SyncJob {
    registry: RegistryClient,
    reconciler: Reconciler,
    dry_run: bool,
    running: Mutex<()>,
}

impl SyncJob {
    pub fn new(registry: RegistryClient, hospitals: Arc<dyn HospitalStore>, dry_run: bool) -> Self {
        Self {
            registry,
            reconciler: Reconciler::new(hospitals),
            dry_run,
            running: Mutex::new(()),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Whether a run currently holds the lock
    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Run once unless a run is already in progress in this process
    ///
    /// `trigger` only labels the log lines.
    ///
    /// # Errors
    ///
    /// Returns the registry error if any page fails (nothing is written),
    /// or the first store error from reconciliation.
    pub async fn run(&self, trigger: &str) -> Result<SyncOutcome> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::warn!(trigger, "Sync already running; trigger skipped");
            return Ok(SyncOutcome::Skipped);
        };

        log_sync_start!(trigger, self.dry_run);
        let start = Instant::now();

        let records = self.registry.fetch_all_records().await.map_err(|e| {
            log_error_with_context!(&e, "Registry fetch failed; sync aborted");
            e
        })?;

        let report = self
            .reconciler
            .reconcile(&records, self.dry_run)
            .await
            .map_err(|e| {
                log_error_with_context!(&e, "Reconciliation failed");
                e
            })?;

        let duration = start.elapsed();
        log_sync_complete!(records.len(), report.written(), duration);

        Ok(SyncOutcome::Completed(SyncSummary {
            records_fetched: records.len(),
            report,
            duration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::adapters::registry::RegistrySource;
    use crate::domain::RegistryError;
    use async_trait::async_trait;

    struct OnePage;

    #[async_trait]
    impl RegistrySource for OnePage {
        async fn fetch_page(&self, page_no: u32) -> std::result::Result<String, RegistryError> {
            let items = if page_no == 1 {
                "<item><ykiho>H1</ykiho><clCd>01</clCd><yadmNm>A</yadmNm></item>"
            } else {
                ""
            };
            Ok(format!(
                "<response><header/><body><items>{items}</items></body></response>"
            ))
        }
    }

    struct Failing;

    #[async_trait]
    impl RegistrySource for Failing {
        async fn fetch_page(&self, page_no: u32) -> std::result::Result<String, RegistryError> {
            Err(RegistryError::Timeout {
                page: page_no,
                seconds: 30,
            })
        }
    }

    fn job(source: Arc<dyn RegistrySource>, store: Arc<MemoryStore>) -> SyncJob {
        let client = RegistryClient::new(source, 2, vec!["01".to_string()]);
        SyncJob::new(client, store, false)
    }

    #[tokio::test]
    async fn test_run_fetches_and_reconciles() {
        let store = Arc::new(MemoryStore::new());
        let outcome = job(Arc::new(OnePage), store.clone()).run("test").await.unwrap();

        let summary = outcome.summary().unwrap();
        assert_eq!(summary.records_fetched, 1);
        assert_eq!(summary.report.created, 1);
        assert_eq!(store.count_hospitals().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let err = job(Arc::new(Failing), store.clone())
            .run("test")
            .await
            .unwrap_err();

        assert!(err.is_registry_failure());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_trigger_skipped_while_locked() {
        let store = Arc::new(MemoryStore::new());
        let job = job(Arc::new(OnePage), store.clone());

        let _held = job.running.lock().await;
        assert!(job.is_running());
        let outcome = job.run("test").await.unwrap();

        assert!(outcome.is_skipped());
        assert_eq!(store.write_count(), 0);
    }
}
