//! Authorization
//!
//! [`authorize`] resolves the [`Requirement`] for an action on a target
//! and evaluates it against the current user. An absent or inactive user
//! always yields `NotAuthenticated` (401) before any ownership check;
//! a failed requirement yields `Forbidden` (403).

pub mod policy;
pub mod predicates;

pub use policy::{authorize, requirement, Action, Requirement, Target};
pub use predicates::{authenticated, is_admin, is_authenticated, is_manager, is_owner};
