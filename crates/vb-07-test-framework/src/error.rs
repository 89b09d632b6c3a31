//! Facade errors.

use shared_types::ConfigError;
use thiserror::Error;
use vb_01_backend::RegistryError;
use vb_03_consistency::ConsistencyError;

/// Failures surfaced by `TestFramework` entry points.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// The JSON configuration could not be parsed.
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub type FrameworkResult<T> = Result<T, FrameworkError>;
