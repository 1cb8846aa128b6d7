//! Scheduler lifecycle and single-flight tests

use async_trait::async_trait;
use purgo::adapters::database::HospitalStore;
use purgo::adapters::memory::MemoryStore;
use purgo::adapters::registry::{RegistryClient, RegistrySource};
use purgo::core::scheduler::{DailySchedule, Scheduler};
use purgo::core::sync::SyncJob;
use purgo::domain::RegistryError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const ONE_HOSPITAL: &str =
    "<response><header/><body><items><item><ykiho>A</ykiho><clCd>01</clCd></item></items></body></response>";

/// Serves one hospital and counts requests
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

#[async_trait]
impl RegistrySource for Counting {
    async fn fetch_page(&self, _page_no: u32) -> Result<String, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ONE_HOSPITAL.to_string())
    }
}

/// Blocks every request until released
#[derive(Default)]
struct Gated {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl RegistrySource for Gated {
    async fn fetch_page(&self, _page_no: u32) -> Result<String, RegistryError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ONE_HOSPITAL.to_string())
    }
}

fn job(source: Arc<dyn RegistrySource>, store: Arc<MemoryStore>) -> Arc<SyncJob> {
    let client = RegistryClient::new(source, 1, vec!["01".to_string()]);
    Arc::new(SyncJob::new(client, store, false))
}

#[tokio::test]
async fn test_start_is_idempotent_and_stop_returns_to_idle() {
    let store = Arc::new(MemoryStore::new());
    let schedule = DailySchedule::new("0 59 23 * * *", None).unwrap();
    let scheduler = Scheduler::new(job(Arc::new(Counting::default()), store), schedule);

    assert!(!scheduler.is_running());
    assert!(scheduler.start());
    assert!(!scheduler.start());
    assert!(scheduler.is_running());

    assert!(scheduler.stop().await);
    assert!(!scheduler.is_running());
    assert!(!scheduler.stop().await);

    assert!(scheduler.start());
    assert!(scheduler.stop().await);
}

#[tokio::test]
async fn test_scheduler_runs_job_on_tick() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(Counting::default());
    let schedule = DailySchedule::new("* * * * * *", Some("UTC")).unwrap();
    let scheduler = Scheduler::new(job(source.clone(), store.clone()), schedule);

    scheduler.start();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while source.calls.load(Ordering::SeqCst) == 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    scheduler.stop().await;

    assert!(source.calls.load(Ordering::SeqCst) >= 1);
    assert_eq!(store.count_hospitals().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_trigger_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    let source = Arc::new(Gated::default());
    let job = job(source.clone(), store.clone());

    let running = tokio::spawn({
        let job = job.clone();
        async move { job.run("first").await }
    });
    source.entered.notified().await;

    let second = job.run("second").await.unwrap();
    assert!(second.is_skipped());

    source.release.notify_one();
    let first = running.await.unwrap().unwrap();
    assert_eq!(first.summary().unwrap().report.created, 1);
    assert!(!job.is_running());
}
