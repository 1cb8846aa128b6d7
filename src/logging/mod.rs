//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable console output
//! - JSON log files with rotation
//! - Configurable log levels
//!
//! # Example
//!
//! ```no_run
//! use purgo::logging::init_logging;
//! use purgo::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

pub use structured::{init_logging, parse_log_level, LoggingGuard};

/// Log the start of a sync run
///
/// # Example
///
/// ```no_run
/// use purgo::log_sync_start;
///
/// log_sync_start!("scheduler", false);
/// ```
#[macro_export]
macro_rules! log_sync_start {
    ($trigger:expr, $dry_run:expr) => {
        tracing::info!(trigger = $trigger, dry_run = $dry_run, "Starting registry sync");
    };
}

/// Log the completion of a sync run
///
/// # Example
///
/// ```no_run
/// use purgo::log_sync_complete;
/// use std::time::Duration;
///
/// log_sync_complete!(1200, 35, Duration::from_secs(40));
/// ```
#[macro_export]
macro_rules! log_sync_complete {
    ($fetched:expr, $written:expr, $duration:expr) => {
        tracing::info!(
            fetched = $fetched,
            written = $written,
            duration_ms = $duration.as_millis() as u64,
            "Registry sync completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use purgo::log_error_with_context;
/// use purgo::domain::PurgoError;
///
/// let error = PurgoError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::PurgoError;
    use std::time::Duration;

    #[test]
    fn test_macros_expand_without_subscriber() {
        log_sync_start!("manual", true);
        log_sync_complete!(10usize, 2usize, Duration::from_millis(5));
        let error = PurgoError::Validation("bad".to_string());
        log_error_with_context!(&error, "testing");
    }
}
