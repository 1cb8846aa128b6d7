//! Domain error types
//!
//! This module defines the error hierarchy for Purgo. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main Purgo error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum PurgoError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Hospital registry errors (network or parse)
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Authorization failures
    #[error("Permission denied: {0}")]
    Permission(#[from] PermissionError),

    /// Lookup of a nonexistent record by primary key
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl PurgoError {
    /// Creates a not-found error for the given entity kind and key
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PurgoError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// HTTP status code a client-facing layer should answer with
    ///
    /// Authentication failures map to 401 and authorization failures to 403,
    /// so callers can tell "log in first" apart from "not allowed".
    pub fn status_code(&self) -> u16 {
        match self {
            PurgoError::Permission(PermissionError::NotAuthenticated) => 401,
            PurgoError::Permission(PermissionError::Forbidden { .. }) => 403,
            PurgoError::NotFound { .. } => 404,
            PurgoError::Validation(_) => 400,
            PurgoError::Registry(_) => 502,
            _ => 500,
        }
    }

    /// Whether this error came from talking to or parsing the registry
    pub fn is_registry_failure(&self) -> bool {
        matches!(self, PurgoError::Registry(_))
    }
}

/// Hospital registry errors
///
/// Errors that occur when fetching or parsing the external hospital registry.
/// These errors don't expose third-party HTTP client or XML parser types.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Transport-level failure talking to the registry
    #[error("Network error on page {page}: {message}")]
    Network { page: u32, message: String },

    /// The request did not complete within the configured timeout
    #[error("Request timeout on page {page} after {seconds}s")]
    Timeout { page: u32, seconds: u64 },

    /// The registry answered with a non-success HTTP status
    #[error("Registry returned status {status} on page {page}")]
    ServerStatus { page: u32, status: u16 },

    /// Malformed XML, unexpected document shape, or non-numeric data in a numeric field
    #[error("Parse error on page {page}: {message}")]
    Parse { page: u32, message: String },
}

impl RegistryError {
    /// Page number the failure occurred on
    pub fn page(&self) -> u32 {
        match self {
            RegistryError::Network { page, .. }
            | RegistryError::Timeout { page, .. }
            | RegistryError::ServerStatus { page, .. }
            | RegistryError::Parse { page, .. } => *page,
        }
    }

    /// True for transport failures (network, timeout, bad status)
    pub fn is_network(&self) -> bool {
        !matches!(self, RegistryError::Parse { .. })
    }
}

/// Authorization failures
///
/// `NotAuthenticated` is always decided before any ownership predicate runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// No principal, or the principal's account is inactive
    #[error("authentication credentials were not provided")]
    NotAuthenticated,

    /// Authenticated, but the requirement for this action was not met
    #[error("not allowed to {action} {resource}")]
    Forbidden {
        action: &'static str,
        resource: &'static str,
    },
}

// Conversion from std::io::Error
impl From<std::io::Error> for PurgoError {
    fn from(err: std::io::Error) -> Self {
        PurgoError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PurgoError {
    fn from(err: serde_json::Error) -> Self {
        PurgoError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PurgoError {
    fn from(err: toml::de::Error) -> Self {
        PurgoError::Configuration(format!("TOML parse error: {err}"))
    }
}
