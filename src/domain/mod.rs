//! Domain models and types for Purgo.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`HospitalId`], [`UserId`], [`SalesHistoryId`], ...)
//! - **Domain models** ([`HospitalRecord`], [`Hospital`], [`User`], [`SalesHistoryEntry`])
//! - **Error types** ([`PurgoError`], [`RegistryError`], [`PermissionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! The registry's hospital key is a string and everything else is a UUID,
//! each behind its own newtype:
//!
//! ```rust
//! use purgo::domain::{HospitalId, UserId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hospital = HospitalId::new("H1")?;
//! let user = UserId::generate();
//!
//! // This won't compile
//! // let wrong: HospitalId = user;
//! # Ok(())
//! # }
//! ```

pub mod directory;
pub mod errors;
pub mod hospital;
pub mod ids;
pub mod result;
pub mod sales;
pub mod user;

pub use directory::{Doctor, Major, School};
pub use errors::{PermissionError, PurgoError, RegistryError};
pub use hospital::{Hospital, HospitalRecord};
pub use ids::{DepartmentId, DoctorId, HospitalId, MajorId, SalesHistoryId, SchoolId, UserId};
pub use result::Result;
pub use sales::{SalesHistoryEntry, SalesStatus};
pub use user::{Department, User};
