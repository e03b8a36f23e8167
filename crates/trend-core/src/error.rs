//! Error types for censored trend analysis
//!
//! Provides a unified error type for all trend crates.

use thiserror::Error;

/// Core error type for trend analysis operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A value token that is neither a number nor a censored marker
    #[error("Invalid value token {token:?}: {reason}")]
    InvalidToken { token: String, reason: String },

    /// Aggregation policy name that is not recognised
    #[error("Unknown aggregation method: {0}")]
    UnknownAggregation(String),

    /// Calendar offset or time unit that cannot be parsed
    #[error("Invalid time offset: {0}")]
    InvalidOffset(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for an unparseable value token
    pub fn invalid_token(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::InvalidInput(format!("{context} contains NaN or infinite values"))
    }

    /// Whether this error means the data was too small to test
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
