//! External system integrations for Purgo.
//!
//! - [`registry`] - Hospital registry open API (HTTP + XML)
//! - [`database`] - Storage traits and backend factory
//! - [`postgresql`] - PostgreSQL implementation
//! - [`memory`] - In-process implementation
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the sync job and
//! services can run against canned registry pages and an in-memory store.
//!
//! ```rust,no_run
//! use purgo::adapters::registry::RegistryClient;
//! use purgo::config::{secret_string, RegistryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig {
//!     api_key: Some(secret_string("service-key".to_string())),
//!     ..RegistryConfig::default()
//! };
//!
//! let client = RegistryClient::from_config(&config)?;
//! let records = client.fetch_all_records().await?;
//! println!("{} hospitals", records.len());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod memory;
pub mod postgresql;
pub mod registry;
