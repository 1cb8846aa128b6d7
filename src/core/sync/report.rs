//! Reconciliation report
//!
//! This module defines the counters produced by one reconciliation run.

use std::collections::BTreeMap;
use std::time::Duration;

/// Outcome of one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Hospitals inserted
    pub created: usize,

    /// Existing hospitals with at least one changed field
    pub updated: usize,

    /// Existing hospitals already current
    pub unchanged: usize,

    /// Records looked at, including the one that failed if the run aborted
    pub processed: usize,

    /// How many hospitals had each field changed
    pub field_changes: BTreeMap<&'static str, usize>,

    /// Wall time of the run
    pub duration: Duration,

    /// Whether writes were skipped
    pub dry_run: bool,
}

impl ReconcileReport {
    /// Create a new empty report
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub(crate) fn record_created(&mut self) {
        self.created += 1;
    }

    pub(crate) fn record_updated(&mut self, fields: &[&'static str]) {
        self.updated += 1;
        for field in fields {
            *self.field_changes.entry(field).or_insert(0) += 1;
        }
    }

    pub(crate) fn record_unchanged(&mut self) {
        self.unchanged += 1;
    }

    /// Number of hospitals written (or that would be, in a dry run)
    pub fn written(&self) -> usize {
        self.created + self.updated
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            processed = self.processed,
            created = self.created,
            updated = self.updated,
            unchanged = self.unchanged,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            "Reconciliation completed"
        );

        for (field, count) in &self.field_changes {
            tracing::debug!(field = *field, count = *count, "Field changes");
        }
    }

    /// Log what was done before a failure cut the run short
    pub fn log_partial(&self) {
        tracing::warn!(
            processed = self.processed,
            created = self.created,
            updated = self.updated,
            unchanged = self.unchanged,
            dry_run = self.dry_run,
            "Reconciliation aborted; partial progress"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = ReconcileReport::new(true);
        assert!(report.dry_run);
        assert_eq!(report.written(), 0);
        assert!(report.field_changes.is_empty());
    }

    #[test]
    fn test_field_changes_accumulate() {
        let mut report = ReconcileReport::new(false);
        report.record_updated(&["phone", "address"]);
        report.record_updated(&["phone"]);
        report.record_created();
        report.record_unchanged();

        assert_eq!(report.updated, 2);
        assert_eq!(report.created, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(report.written(), 3);
        assert_eq!(report.field_changes.get("phone"), Some(&2));
        assert_eq!(report.field_changes.get("address"), Some(&1));
    }
}
