//! Database abstraction layer
//!
//! Trait-based storage interfaces and a factory that picks the backend
//! (PostgreSQL or in-memory) from configuration.

pub mod factory;
pub mod traits;

pub use factory::{create_stores, Stores};
pub use traits::{DatabaseClient, DirectoryStore, HospitalStore, SalesHistoryStore, UserStore};
