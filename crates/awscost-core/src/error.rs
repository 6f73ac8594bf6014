//! Error types for awscost
//!
//! This module defines the error types used throughout the awscost crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use awscost_core::error::{AwsCostError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to AwsCostError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Main error type for awscost operations
///
/// Fetch failures and malformed responses are the two errors the cost
/// pipeline itself produces; the rest come from configuration and argument
/// handling.
#[derive(Error, Debug)]
pub enum AwsCostError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The underlying cost query failed (auth, throttling, network, ...)
    #[error("{operation} failed: {message}")]
    Fetch {
        /// The remote operation that failed
        operation: String,
        /// Error details, including the AWS error code when there is one
        message: String,
    },

    /// The cost query returned data that cannot be flattened
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AwsCostError {
    /// Build a fetch error for the given remote operation
    pub fn fetch(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Build a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

/// Convenience type alias for Results in awscost
///
/// # Example
///
/// ```
/// use awscost_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, AwsCostError>;
