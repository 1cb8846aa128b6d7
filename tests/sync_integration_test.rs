//! End-to-end sync tests: canned registry pages reconciled into the
//! in-memory store

use async_trait::async_trait;
use purgo::adapters::database::HospitalStore;
use purgo::adapters::memory::MemoryStore;
use purgo::adapters::registry::{RegistryClient, RegistrySource};
use purgo::core::sync::SyncJob;
use purgo::domain::{HospitalId, RegistryError, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Pages served from memory; a missing page is a server error
struct Pages {
    pages: Mutex<HashMap<u32, String>>,
}

impl Pages {
    fn new(pages: Vec<(u32, String)>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().collect()),
        }
    }

    fn replace(&self, page_no: u32, body: String) {
        self.pages.lock().unwrap().insert(page_no, body);
    }
}

#[async_trait]
impl RegistrySource for Pages {
    async fn fetch_page(&self, page_no: u32) -> Result<String, RegistryError> {
        self.pages
            .lock()
            .unwrap()
            .get(&page_no)
            .cloned()
            .ok_or(RegistryError::ServerStatus {
                page: page_no,
                status: 500,
            })
    }
}

fn body(items: &[(&str, &str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(id, code, phone)| {
            format!("<item><ykiho>{id}</ykiho><clCd>{code}</clCd><telno>{phone}</telno></item>")
        })
        .collect();
    format!("<response><header/><body><items>{items}</items></body></response>")
}

fn job(source: Arc<Pages>, store: Arc<MemoryStore>, dry_run: bool) -> SyncJob {
    let allowed = ["01", "11", "41", "51"].map(String::from).to_vec();
    SyncJob::new(RegistryClient::new(source, 2, allowed), store, dry_run)
}

#[tokio::test]
async fn test_full_sync_then_idempotent_rerun() {
    let source = Arc::new(Pages::new(vec![
        (1, body(&[("A", "01", "1"), ("B", "31", "2")])),
        (2, body(&[("C", "41", "3")])),
    ]));
    let store = Arc::new(MemoryStore::new());
    let job = job(source, store.clone(), false);

    let first = job.run("test").await.unwrap();
    let summary = first.summary().unwrap();
    assert_eq!(summary.records_fetched, 2);
    assert_eq!(summary.report.created, 2);
    assert_eq!(store.count_hospitals().await.unwrap(), 2);

    let writes = store.write_count();
    let second = job.run("test").await.unwrap();
    let summary = second.summary().unwrap();
    assert_eq!(summary.report.unchanged, 2);
    assert_eq!(summary.report.written(), 0);
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_changed_field_updates_without_touching_manager() {
    let source = Arc::new(Pages::new(vec![
        (1, body(&[("A", "01", "02-111")])),
        (2, body(&[])),
    ]));
    let store = Arc::new(MemoryStore::new());
    let job = job(source.clone(), store.clone(), false);
    let id = HospitalId::new("A").unwrap();
    let manager = UserId::generate();

    job.run("test").await.unwrap();
    store.set_manager(&id, Some(manager)).await.unwrap();

    source.replace(1, body(&[("A", "01", "02-222")]));
    let outcome = job.run("test").await.unwrap();
    let report = &outcome.summary().unwrap().report;
    assert_eq!(report.updated, 1);
    assert_eq!(report.field_changes.get("phone"), Some(&1));

    let stored = store.get_hospital(&id).await.unwrap().unwrap();
    assert_eq!(stored.info.phone.as_deref(), Some("02-222"));
    assert_eq!(stored.manager, Some(manager));
}

#[tokio::test]
async fn test_hospital_missing_from_later_fetch_is_left_alone() {
    let source = Arc::new(Pages::new(vec![
        (1, body(&[("A", "01", "02-111"), ("B", "11", "02-333")])),
        (2, body(&[])),
    ]));
    let store = Arc::new(MemoryStore::new());
    let job = job(source.clone(), store.clone(), false);
    let b = HospitalId::new("B").unwrap();

    job.run("test").await.unwrap();
    store.set_manager(&b, Some(UserId::generate())).await.unwrap();
    let before = store.get_hospital(&b).await.unwrap().unwrap();

    source.replace(1, body(&[("A", "01", "02-222")]));
    let outcome = job.run("test").await.unwrap();
    let report = &outcome.summary().unwrap().report;
    assert_eq!(report.processed, 1);
    assert_eq!(report.updated, 1);

    let after = store.get_hospital(&b).await.unwrap().unwrap();
    assert_eq!(after, before);
    assert_eq!(store.count_hospitals().await.unwrap(), 2);
}

#[tokio::test]
async fn test_failure_on_later_page_writes_nothing() {
    let source = Arc::new(Pages::new(vec![(1, body(&[("A", "01", "1")]))]));
    let store = Arc::new(MemoryStore::new());

    let err = job(source, store.clone(), false)
        .run("test")
        .await
        .unwrap_err();

    assert!(err.is_registry_failure());
    assert_eq!(err.status_code(), 502);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_dry_run_reports_without_writing() {
    let source = Arc::new(Pages::new(vec![
        (1, body(&[("A", "01", "1")])),
        (2, body(&[("B", "51", "2")])),
    ]));
    let store = Arc::new(MemoryStore::new());

    let outcome = job(source, store.clone(), true).run("test").await.unwrap();
    let report = &outcome.summary().unwrap().report;

    assert!(report.dry_run);
    assert_eq!(report.created, 2);
    assert_eq!(store.write_count(), 0);
}
