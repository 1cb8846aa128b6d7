//! Result type alias for Purgo

use super::errors::PurgoError;

/// Result type alias for Purgo operations
///
/// # Examples
///
/// ```
/// use purgo::domain::result::Result;
/// use purgo::domain::errors::PurgoError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PurgoError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PurgoError>;
