//! Consistency verification errors.

use shared_types::ConfigError;
use thiserror::Error;

/// Fatal consistency verification failures.
///
/// Partial backend failure is not an error; it is recorded in the report.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsistencyError {
    /// No backend returned an intact verification.
    #[error("Vault {vault_id} could not be verified on any of {attempted} backends")]
    NoBackendReachable { vault_id: String, attempted: usize },

    /// Rejected before any backend call.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type ConsistencyResult<T> = Result<T, ConsistencyError>;
