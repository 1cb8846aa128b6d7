//! Sales history domain model

use super::ids::{HospitalId, SalesHistoryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length of a sales history entry's content
pub const CONTENT_MAX_LEN: usize = 255;

/// Stage of a sales activity
///
/// Stored as a small integer code; the display name is what clients see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SalesStatus {
    Active,
    BestCase,
    Pipeline,
    Opportunity,
    Funnel,
}

impl SalesStatus {
    /// Every status, in code order
    pub const ALL: [SalesStatus; 5] = [
        SalesStatus::Active,
        SalesStatus::BestCase,
        SalesStatus::Pipeline,
        SalesStatus::Opportunity,
        SalesStatus::Funnel,
    ];

    /// Storage code
    pub fn code(self) -> i16 {
        match self {
            SalesStatus::Active => 1,
            SalesStatus::BestCase => 2,
            SalesStatus::Pipeline => 3,
            SalesStatus::Opportunity => 4,
            SalesStatus::Funnel => 5,
        }
    }

    /// Inverse of [`SalesStatus::code`]
    pub fn from_code(code: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Display name
    pub fn display_name(self) -> &'static str {
        match self {
            SalesStatus::Active => "ACTIVE",
            SalesStatus::BestCase => "BEST_CASE",
            SalesStatus::Pipeline => "PIPELINE",
            SalesStatus::Opportunity => "OPPORTUNITY",
            SalesStatus::Funnel => "FUNNEL",
        }
    }
}

impl Default for SalesStatus {
    fn default() -> Self {
        SalesStatus::Active
    }
}

impl fmt::Display for SalesStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SalesStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|status| status.display_name() == upper)
            .ok_or_else(|| format!("Unknown sales status: {s}"))
    }
}

/// One logged sales activity against a hospital
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesHistoryEntry {
    pub id: SalesHistoryId,

    /// Owning hospital; entries are removed together with it
    pub hospital: HospitalId,

    pub content: String,
    pub status: SalesStatus,
    pub created_at: DateTime<Utc>,

    /// Bumped by the store on every write
    pub modified_at: DateTime<Utc>,
}

impl SalesHistoryEntry {
    /// Creates a new entry stamped with the current time
    pub fn new(
        hospital: HospitalId,
        content: impl Into<String>,
        status: SalesStatus,
    ) -> Result<Self, String> {
        let content = content.into();
        validate_content(&content)?;
        let now = Utc::now();
        Ok(Self {
            id: SalesHistoryId::generate(),
            hospital,
            content,
            status,
            created_at: now,
            modified_at: now,
        })
    }
}

/// Checks a content string against the column constraints
pub fn validate_content(content: &str) -> Result<(), String> {
    if content.trim().is_empty() {
        return Err("Sales history content cannot be empty".to_string());
    }
    if content.chars().count() > CONTENT_MAX_LEN {
        return Err(format!(
            "Sales history content must be at most {CONTENT_MAX_LEN} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        for status in SalesStatus::ALL {
            assert_eq!(SalesStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(SalesStatus::from_code(0), None);
        assert_eq!(SalesStatus::from_code(6), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("best_case".parse::<SalesStatus>(), Ok(SalesStatus::BestCase));
        assert_eq!("FUNNEL".parse::<SalesStatus>(), Ok(SalesStatus::Funnel));
        assert!("WON".parse::<SalesStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uses_display_names() {
        let json = serde_json::to_string(&SalesStatus::BestCase).unwrap();
        assert_eq!(json, "\"BEST_CASE\"");
    }

    #[test]
    fn test_new_entry_timestamps() {
        let entry = SalesHistoryEntry::new(
            HospitalId::new("H1").unwrap(),
            "Demo scheduled",
            SalesStatus::Pipeline,
        )
        .unwrap();
        assert_eq!(entry.created_at, entry.modified_at);
        assert_eq!(entry.status, SalesStatus::Pipeline);
    }

    #[test]
    fn test_content_validation() {
        let id = HospitalId::new("H1").unwrap();
        assert!(SalesHistoryEntry::new(id.clone(), "", SalesStatus::Active).is_err());
        assert!(SalesHistoryEntry::new(id, "x".repeat(256), SalesStatus::Active).is_err());
    }
}
