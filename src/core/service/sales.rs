//! Sales history and the sales dashboard

use super::{found, require_login};
use crate::adapters::database::traits::{HospitalStore, SalesHistoryStore};
use crate::core::authz::{authorize, Action, Target};
use crate::domain::hospital::Hospital;
use crate::domain::ids::{HospitalId, SalesHistoryId, UserId};
use crate::domain::sales::{validate_content, SalesHistoryEntry, SalesStatus};
use crate::domain::user::User;
use crate::domain::{PurgoError, Result};
use std::sync::Arc;

/// Default number of entries in [`SalesDashboard::recent`]
pub const DASHBOARD_RECENT_LIMIT: usize = 10;

/// Partial update of an entry
#[derive(Debug, Clone, Default)]
pub struct SalesUpdate {
    pub content: Option<String>,
    pub status: Option<SalesStatus>,
}

/// Aggregated view of sales activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesDashboard {
    /// One row per status in pipeline order, zero counts included
    pub status_counts: Vec<(SalesStatus, u64)>,

    /// Most recently modified entries, newest first
    pub recent: Vec<SalesHistoryEntry>,
}

impl SalesDashboard {
    pub fn total(&self) -> u64 {
        self.status_counts.iter().map(|(_, count)| count).sum()
    }

    pub fn count(&self, status: SalesStatus) -> u64 {
        self.status_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, count)| *count)
    }
}

pub struct SalesHistoryService {
    sales: Arc<dyn SalesHistoryStore>,
    hospitals: Arc<dyn HospitalStore>,
}

impl SalesHistoryService {
    pub fn new(sales: Arc<dyn SalesHistoryStore>, hospitals: Arc<dyn HospitalStore>) -> Self {
        Self { sales, hospitals }
    }

    async fn hospital(&self, id: &HospitalId) -> Result<Hospital> {
        found(self.hospitals.get_hospital(id).await?, "hospital", id)
    }

    async fn entry(&self, id: &SalesHistoryId) -> Result<SalesHistoryEntry> {
        found(self.sales.get_sales_entry(id).await?, "sales history", id)
    }

    /// Log activity against a hospital; its manager or an admin only
    pub async fn create(
        &self,
        principal: Option<&User>,
        hospital_id: &HospitalId,
        content: &str,
        status: SalesStatus,
    ) -> Result<SalesHistoryEntry> {
        require_login(principal)?;
        let hospital = self.hospital(hospital_id).await?;
        authorize(
            principal,
            &Target::SalesHistory {
                hospital: &hospital,
            },
            Action::Create,
        )?;

        let entry = SalesHistoryEntry::new(hospital_id.clone(), content, status)
            .map_err(PurgoError::Validation)?;
        self.sales.insert_sales_entry(&entry).await?;
        tracing::debug!(entry_id = %entry.id, hospital_id = %hospital_id, "Sales history created");
        Ok(entry)
    }

    /// Change content or status; bumps `modified_at`
    pub async fn update(
        &self,
        principal: Option<&User>,
        id: &SalesHistoryId,
        update: SalesUpdate,
    ) -> Result<SalesHistoryEntry> {
        require_login(principal)?;
        let mut entry = self.entry(id).await?;
        let hospital = self.hospital(&entry.hospital).await?;
        authorize(
            principal,
            &Target::SalesHistory {
                hospital: &hospital,
            },
            Action::Update,
        )?;

        if let Some(content) = update.content {
            validate_content(&content).map_err(PurgoError::Validation)?;
            entry.content = content;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }

        self.sales.update_sales_entry(&entry).await
    }

    pub async fn delete(&self, principal: Option<&User>, id: &SalesHistoryId) -> Result<()> {
        require_login(principal)?;
        let entry = self.entry(id).await?;
        let hospital = self.hospital(&entry.hospital).await?;
        authorize(
            principal,
            &Target::SalesHistory {
                hospital: &hospital,
            },
            Action::Delete,
        )?;

        self.sales.delete_sales_entry(id).await?;
        Ok(())
    }

    pub async fn get(&self, principal: Option<&User>, id: &SalesHistoryId) -> Result<SalesHistoryEntry> {
        require_login(principal)?;
        self.entry(id).await
    }

    /// Entries of one hospital, most recently modified first
    pub async fn list_for_hospital(
        &self,
        principal: Option<&User>,
        hospital_id: &HospitalId,
    ) -> Result<Vec<SalesHistoryEntry>> {
        require_login(principal)?;
        self.hospital(hospital_id).await?;
        self.sales.list_sales_for_hospital(hospital_id).await
    }

    /// Per-status counts and recent activity
    ///
    /// With `manager`, only hospitals managed by that user are counted.
    pub async fn dashboard(
        &self,
        principal: Option<&User>,
        manager: Option<&UserId>,
        recent_limit: usize,
    ) -> Result<SalesDashboard> {
        require_login(principal)?;

        let stored = self.sales.sales_status_counts(manager).await?;
        let status_counts = SalesStatus::ALL
            .iter()
            .map(|status| {
                let count = stored
                    .iter()
                    .find(|(s, _)| s == status)
                    .map_or(0, |(_, count)| *count);
                (*status, count)
            })
            .collect();

        let recent = self.sales.recent_sales(manager, recent_limit).await?;

        Ok(SalesDashboard {
            status_counts,
            recent,
        })
    }
}
