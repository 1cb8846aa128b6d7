//! Storage factory
//!
//! Builds every store handle from one backend so they share a pool.

use crate::adapters::database::traits::{
    DatabaseClient, DirectoryStore, HospitalStore, SalesHistoryStore, UserStore,
};
use crate::adapters::memory::MemoryStore;
use crate::adapters::postgresql::adapter::PostgreSQLAdapter;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::config::schema::{DatabaseTarget, PurgoConfig};
use crate::domain::{PurgoError, Result};
use std::sync::Arc;

/// Trait-object handles onto a single storage backend
#[derive(Clone)]
pub struct Stores {
    pub client: Arc<dyn DatabaseClient>,
    pub hospitals: Arc<dyn HospitalStore>,
    pub users: Arc<dyn UserStore>,
    pub sales: Arc<dyn SalesHistoryStore>,
    pub directory: Arc<dyn DirectoryStore>,
}

impl Stores {
    /// Handles onto one value implementing every store trait
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: DatabaseClient
            + HospitalStore
            + UserStore
            + SalesHistoryStore
            + DirectoryStore
            + 'static,
    {
        Self {
            client: backend.clone() as Arc<dyn DatabaseClient>,
            hospitals: backend.clone() as Arc<dyn HospitalStore>,
            users: backend.clone() as Arc<dyn UserStore>,
            sales: backend.clone() as Arc<dyn SalesHistoryStore>,
            directory: backend as Arc<dyn DirectoryStore>,
        }
    }

    /// Fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }
}

/// Create the configured storage backend
///
/// For PostgreSQL this connects, checks the connection and runs the
/// embedded migration.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or initialized.
pub async fn create_stores(config: &PurgoConfig) -> Result<Stores> {
    match config.database.target {
        DatabaseTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                PurgoError::Configuration(
                    "postgresql configuration is required when database.target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL stores");
            let client = Arc::new(PostgreSQLClient::new(pg_config.clone()).await?);
            let adapter = Arc::new(PostgreSQLAdapter::new_with_arc(client));
            adapter.test_connection().await?;
            adapter.ensure_schema().await?;

            Ok(Stores::from_backend(adapter))
        }
        DatabaseTarget::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on exit");
            Ok(Stores::in_memory())
        }
    }
}
