//! PostgreSQL client implementation
//!
//! Connection pooling and query helpers shared by the store implementations.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{PurgoError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

const MIGRATION_SQL: &str = include_str!("../../../migrations/001_initial_schema.sql");

/// PostgreSQL client for Purgo
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// The pool connects lazily; call [`PostgreSQLClient::test_connection`]
    /// to fail fast on bad credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config =
            config.connection_string.expose_secret().parse().map_err(|e| {
                PurgoError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        // Every pooled session gets the statement timeout
        pg_config.options(&format!(
            "-c statement_timeout={}",
            config.statement_timeout_seconds * 1000
        ));
        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .build()
            .map_err(|e| {
                PurgoError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PurgoError::Database(format!("Connection test failed: {}", e)))?;

        tracing::info!(database = %self.connection_string_safe(), "PostgreSQL connection test successful");
        Ok(())
    }

    /// Run the embedded migration
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub async fn ensure_schema(&self) -> Result<()> {
        if !self.config.run_migrations {
            tracing::debug!("Skipping schema migration (postgresql.run_migrations = false)");
            return Ok(());
        }

        let client = self.get_connection().await?;
        client
            .batch_execute(MIGRATION_SQL)
            .await
            .map_err(|e| PurgoError::Database(format!("Failed to execute migration: {}", e)))?;

        tracing::info!("PostgreSQL schema initialized successfully");
        Ok(())
    }

    /// Get a connection from the pool
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            PurgoError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Execute a query and return rows
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| map_db_error("Query failed", e))
    }

    /// Execute a query expected to return at most one row
    pub async fn query_opt(
        &self,
        query: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>> {
        let client = self.get_connection().await?;
        client
            .query_opt(query, params)
            .await
            .map_err(|e| map_db_error("Query failed", e))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.get_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| map_db_error("Statement execution failed", e))
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

/// Replaces everything before the host with `***`
pub fn redact_connection_string(conn: &str) -> String {
    conn.rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{}", host))
        .unwrap_or_else(|| "postgresql://***".to_string())
}

fn map_db_error(context: &str, err: tokio_postgres::Error) -> PurgoError {
    match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => {
            PurgoError::Validation(format!("duplicate value: {}", err))
        }
        Some(code) if *code == SqlState::FOREIGN_KEY_VIOLATION => {
            PurgoError::Validation(format!("referenced record does not exist: {}", err))
        }
        _ => PurgoError::Database(format!("{}: {}", context, err)),
    }
}
