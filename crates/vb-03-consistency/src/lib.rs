//! # VB-03 Consistency Verification
//!
//! Quorum-style verification of one logical vault replicated across many
//! backends: integrity on each backend, then field-by-field agreement.
//!
//! ## Scoring
//!
//! | Component | Weight |
//! |-----------|--------|
//! | Backends with an intact verification | 60% |
//! | Enabled fields consistent across backends | 40% |
//!
//! Total unreachability is the only fatal condition; partial failure is
//! recorded in the report.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::{ConsistencyChecks, ConsistencyConfig};
pub use domain::{
    BackendVerification, ConsistencyField, ConsistencyReport, FieldConsistency, Inconsistency,
    InconsistencySeverity, VaultSnapshot,
};
pub use error::{ConsistencyError, ConsistencyResult};
pub use service::ConsistencyVerifier;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
