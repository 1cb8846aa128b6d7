//! Doctors and the reference data that describes them

use super::ids::{DoctorId, MajorId, SchoolId};
use serde::{Deserialize, Serialize};

/// Maximum doctor, school or major name length
pub const NAME_MAX_LEN: usize = 50;

/// Medical school
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
}

impl School {
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        Ok(Self {
            id: SchoolId::generate(),
            name: checked_name(name.into(), "School name")?,
        })
    }
}

/// Medical specialty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Major {
    pub id: MajorId,
    pub name: String,
}

impl Major {
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        Ok(Self {
            id: MajorId::generate(),
            name: checked_name(name.into(), "Major name")?,
        })
    }
}

/// Doctor, possibly serving as a hospital director
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub graduate_year: Option<i32>,
    pub graduate_school: Option<SchoolId>,
    pub major: Option<MajorId>,
}

impl Doctor {
    /// Creates a doctor with no education details
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        Ok(Self {
            id: DoctorId::generate(),
            name: checked_name(name.into(), "Doctor name")?,
            graduate_year: None,
            graduate_school: None,
            major: None,
        })
    }
}

fn checked_name(name: String, label: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err(format!("{label} cannot be empty"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(format!("{label} must be at most {NAME_MAX_LEN} characters"));
    }
    Ok(name)
}
