//! Core business logic for Purgo.
//!
//! # Modules
//!
//! - [`sync`] - Registry fetch and reconciliation behind a single-flight lock
//! - [`scheduler`] - Daily background trigger for the sync job
//! - [`authz`] - Permission predicates and per-resource policy
//! - [`service`] - User, hospital, sales history and directory operations
//!
//! # Sync Workflow
//!
//! 1. **Fetch**: Pull every registry page; any failure aborts with no writes
//! 2. **Filter**: Keep only the allowed classification codes
//! 3. **Reconcile**: Insert new hospitals, rewrite changed registry fields
//! 4. **Report**: Log created/updated/unchanged counts
//!
//! # Example
//!
//! ```rust,no_run
//! use purgo::adapters::database::create_stores;
//! use purgo::adapters::registry::RegistryClient;
//! use purgo::config::load_config;
//! use purgo::core::scheduler::{DailySchedule, Scheduler};
//! use purgo::core::sync::SyncJob;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("purgo.toml")?;
//! let stores = create_stores(&config).await?;
//!
//! let registry = RegistryClient::from_config(&config.registry)?;
//! let job = Arc::new(SyncJob::new(registry, stores.hospitals.clone(), false));
//!
//! let scheduler = Scheduler::new(job, DailySchedule::from_config(&config.scheduler)?);
//! scheduler.start();
//! // ... until shutdown
//! scheduler.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod authz;
pub mod scheduler;
pub mod service;
pub mod sync;
