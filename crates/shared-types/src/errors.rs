//! # Error Types
//!
//! Errors shared across crates: backend call failures and configuration
//! rejections.

use thiserror::Error;

/// Errors a backend call can produce.
///
/// These never escape an engine: they are classified into outcomes,
/// `OperationError`s or test results.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The backend session is not connected.
    #[error("Backend not connected")]
    NotConnected,

    /// The requested vault does not exist on this backend.
    #[error("Vault not found: {0}")]
    VaultNotFound(String),

    /// Multi-sig request does not exist.
    #[error("Multi-sig request not found: {0}")]
    RequestNotFound(String),

    /// The backend refused the call outright.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Transport or RPC failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend itself reported a timeout.
    #[error("Backend timed out after {0}ms")]
    Timeout(u64),

    /// Capability not provided by this chain family.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Invalid engine configuration, rejected before any backend call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// A weight table does not sum to the required total.
    #[error("Invalid distribution: weights sum to {sum}, expected {expected}")]
    InvalidDistribution { sum: u32, expected: u32 },

    /// A value that must be positive was zero.
    #[error("Invalid value for {field}: must be greater than zero")]
    ZeroValue { field: &'static str },

    /// A value is outside its accepted range.
    #[error("Invalid value for {field}: {value} (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// No backends supplied to an engine.
    #[error("No backends supplied")]
    NoBackends,

    /// Configuration document could not be parsed.
    #[error("Malformed configuration: {0}")]
    Malformed(String),
}

/// Reject a zero value for `field`.
pub fn ensure_positive(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroValue { field });
    }
    Ok(())
}
