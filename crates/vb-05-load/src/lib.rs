//! # VB-05 Load Generation
//!
//! Concurrent synthetic workload against vault backends: weighted random
//! operations on a pool of test vaults until a wall-clock deadline.
//!
//! Workers never share mutable state. Each keeps its own tally; tallies are
//! merged once every worker has finished.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

pub use config::{LoadConfig, TransactionDistribution, MAX_TEST_DURATION_SECS};
pub use domain::{
    BackendLoadStats, LoadOperation, LoadPhase, LoadTally, LoadTestResult, OperationError,
};
pub use service::LoadGenerator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
