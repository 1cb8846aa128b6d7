//! Resource services
//!
//! Each service wraps one or more stores and checks permissions with
//! [`crate::core::authz::authorize`] before touching them. Services hold
//! no state of their own and are safe to share across tasks.

pub mod directory;
pub mod hospitals;
pub mod sales;
pub mod users;

pub use directory::{DirectoryService, DoctorUpdate};
pub use hospitals::HospitalService;
pub use sales::{SalesDashboard, SalesHistoryService, SalesUpdate};
pub use users::{ProfileUpdate, UserService};

use crate::core::authz::authenticated;
use crate::domain::{PermissionError, PurgoError, Result, User};

/// Fails with `NotAuthenticated` unless the principal is an active user
fn require_login(principal: Option<&User>) -> Result<&User> {
    authenticated(principal).ok_or(PurgoError::Permission(PermissionError::NotAuthenticated))
}

/// Turns a missing row into `NotFound`
fn found<T>(value: Option<T>, entity: &'static str, id: impl ToString) -> Result<T> {
    value.ok_or_else(|| PurgoError::not_found(entity, id))
}
