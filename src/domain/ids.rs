//! Domain identifier types with validation
//!
//! Newtype wrappers keep the registry's hospital key and the internal
//! UUID keys of users, departments and the rest from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Hospital identifier newtype wrapper
///
/// The registry's external id (`ykiho`). Uninterpreted, stable, and the
/// primary key of the `hospitals` table.
///
/// # Examples
///
/// ```
/// use purgo::domain::ids::HospitalId;
/// use std::str::FromStr;
///
/// let id = HospitalId::from_str("JDQ4MTYyMiM4MSMkMSMkMCMkODkkMzgxMzUxIzExIyQxIyQzIyQ4OSQyNjE4MzIjNjEjJDEjJDQjJDgz").unwrap();
/// assert!(id.as_str().starts_with("JDQ4"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HospitalId(String);

impl HospitalId {
    /// Creates a new HospitalId from a string
    ///
    /// Returns `Err` if the id is empty or whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Hospital ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the hospital ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for HospitalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HospitalId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for HospitalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| format!("Invalid {}: {e}", stringify!($name)))
            }
        }
    };
}

uuid_id!(
    /// User (sales employee) identifier
    UserId
);
uuid_id!(
    /// Department identifier
    DepartmentId
);
uuid_id!(
    /// Doctor identifier
    DoctorId
);
uuid_id!(
    /// School identifier
    SchoolId
);
uuid_id!(
    /// Major identifier
    MajorId
);
uuid_id!(
    /// Sales history entry identifier
    SalesHistoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hospital_id_valid() {
        let id = HospitalId::new("H1").unwrap();
        assert_eq!(id.as_str(), "H1");
        assert_eq!(id.to_string(), "H1");
    }

    #[test]
    fn test_hospital_id_empty() {
        assert!(HospitalId::new("").is_err());
        assert!(HospitalId::new("   ").is_err());
    }

    #[test]
    fn test_hospital_id_serde() {
        let id = HospitalId::new("H1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"H1\"");
        let back: HospitalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_uuid_ids_parse() {
        let id = UserId::generate();
        let parsed = UserId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(UserId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_uuid_ids_distinct() {
        assert_ne!(SalesHistoryId::generate(), SalesHistoryId::generate());
    }
}
