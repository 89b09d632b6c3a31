//! # VB-02 Fan-Out Coordinator
//!
//! Shared concurrency primitive of the engines: executes a unit of work
//! against many backends (or many times against one backend) as isolated
//! tokio tasks, each bounded by a timeout, and collects one
//! `OperationOutcome` per unit.
//!
//! ## Guarantees
//!
//! | Failure in one task | Effect |
//! |---------------------|--------|
//! | Backend error | `EXCEPTION` outcome for that backend |
//! | Business rejection | `TX_FAILED` / `INTEGRITY_FAILED` outcome, value kept |
//! | Per-call timeout | `TIMEOUT` outcome |
//! | Overall deadline | `DEADLINE_EXCEEDED` outcome, task aborted |
//! | Panic | `EXCEPTION` outcome |

#![warn(clippy::all)]

pub mod coordinator;

pub use coordinator::{FanOutConfig, FanOutCoordinator, FanOutResult, Settled};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
