//! Result type alias
//!
//! This module provides a convenient Result type alias that uses BridgeError
//! as the error type.

use super::errors::BridgeError;

/// Result type alias for bridge operations
///
/// # Examples
///
/// ```
/// use meshbridge::domain::result::Result;
/// use meshbridge::domain::errors::BridgeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BridgeError::Conversion("zero rows".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BridgeError>;
