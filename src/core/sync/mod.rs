//! Registry synchronization
//!
//! - [`reconciler`]: upserts fetched records into the hospital store
//! - [`report`]: counters for one reconciliation run
//! - [`job`]: fetch plus reconcile behind a single-flight lock

pub mod job;
pub mod reconciler;
pub mod report;

pub use job::{SyncJob, SyncOutcome, SyncSummary};
pub use reconciler::Reconciler;
pub use report::ReconcileReport;
