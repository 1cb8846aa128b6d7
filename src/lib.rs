// Purgo - Hospital Registry Sync for Sales Teams
// Copyright (c) 2025 Purgo Contributors
// Licensed under the MIT License

//! # Purgo - Hospital Registry Sync
//!
//! Purgo keeps a sales team's hospital database in step with the public
//! hospital registry and guards the sales records built on top of it.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Fetching** the paginated XML hospital registry
//! - **Reconciling** registry records into the database as an upsert
//! - **Scheduling** the sync once a day in the background
//! - **Authorizing** access to users, hospitals and sales history
//!
//! ## Architecture
//!
//! Purgo follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (sync, scheduler, authorization, services)
//! - [`adapters`] - External integrations (registry, PostgreSQL, in-memory store)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use purgo::adapters::database::create_stores;
//! use purgo::adapters::registry::RegistryClient;
//! use purgo::config::load_config;
//! use purgo::core::sync::SyncJob;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("purgo.toml")?;
//!     let stores = create_stores(&config).await?;
//!
//!     let registry = RegistryClient::from_config(&config.registry)?;
//!     let job = SyncJob::new(registry, stores.hospitals.clone(), false);
//!
//!     if let Some(summary) = job.run("example").await?.summary() {
//!         println!("Created {} hospitals", summary.report.created);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Authorization
//!
//! Every service call takes the current user, if any. Missing or inactive
//! users are rejected before any ownership rule is looked at:
//!
//! ```rust
//! use purgo::core::authz::{authorize, Action, Target};
//! use purgo::domain::{PermissionError, User};
//!
//! let admin = User::new_superuser("root@example.com", "Root").unwrap();
//! assert!(authorize(Some(&admin), &Target::Department, Action::Create).is_ok());
//! assert_eq!(
//!     authorize(None, &Target::Department, Action::Create),
//!     Err(PermissionError::NotAuthenticated)
//! );
//! ```
//!
//! ## Error Handling
//!
//! Purgo uses the [`domain::PurgoError`] type for all errors.
//! [`domain::PurgoError::status_code`] gives the status a client-facing
//! layer should answer with.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
