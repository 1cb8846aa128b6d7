//! Registry-to-store reconciliation
//!
//! Upserts each registry record: new hospitals are inserted unassigned,
//! existing ones get only their registry-sourced columns rewritten, and
//! only when something differs. Nothing is ever deleted.

use crate::adapters::database::traits::HospitalStore;
use crate::adapters::registry::RecordSet;
use crate::core::sync::report::ReconcileReport;
use crate::domain::hospital::{Hospital, HospitalRecord};
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;

/// Applies a [`RecordSet`] to a [`HospitalStore`]
pub struct Reconciler {
    hospitals: Arc<dyn HospitalStore>,
}

impl Reconciler {
    pub fn new(hospitals: Arc<dyn HospitalStore>) -> Self {
        Self { hospitals }
    }

    /// Reconcile every record in iteration order
    ///
    /// With `dry_run` the report is computed from reads alone.
    ///
    /// # Errors
    ///
    /// The first store failure stops the run and is returned; the
    /// progress made up to that point is logged.
    pub async fn reconcile(&self, records: &RecordSet, dry_run: bool) -> Result<ReconcileReport> {
        let start = Instant::now();
        let mut report = ReconcileReport::new(dry_run);

        for record in records.iter() {
            report.processed += 1;

            if let Err(e) = self.reconcile_one(record, dry_run, &mut report).await {
                tracing::error!(
                    hospital_id = %record.hospital_id,
                    error = %e,
                    "Failed to persist hospital"
                );
                report.duration = start.elapsed();
                report.log_partial();
                return Err(e);
            }
        }

        let report = report.with_duration(start.elapsed());
        report.log_summary();
        Ok(report)
    }

    async fn reconcile_one(
        &self,
        record: &HospitalRecord,
        dry_run: bool,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        match self.hospitals.get_hospital(&record.hospital_id).await? {
            Some(existing) => {
                let changed = existing.info.diff(record);
                if changed.is_empty() {
                    report.record_unchanged();
                    return Ok(());
                }

                tracing::debug!(
                    hospital_id = %record.hospital_id,
                    fields = ?changed,
                    "Hospital changed"
                );
                if !dry_run {
                    self.hospitals.update_registry_fields(record).await?;
                }
                report.record_updated(&changed);
            }
            None => {
                tracing::debug!(hospital_id = %record.hospital_id, "New hospital");
                if !dry_run {
                    self.hospitals
                        .insert_hospital(&Hospital::from_record(record.clone()))
                        .await?;
                }
                report.record_created();
            }
        }
        Ok(())
    }
}
