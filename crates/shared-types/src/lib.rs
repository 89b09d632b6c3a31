//! # Shared Types Crate
//!
//! Value types shared by the backend capability interface, the fan-out
//! coordinator and the engines (consistency, benchmark, load, vulnerability
//! scan).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: vaults, receipts and integrity reports are
//!   defined once here.
//! - **Outcome-Derived Aggregates**: every engine aggregate is computed from
//!   `OperationOutcome`s; nothing else feeds scoring.
//! - **Plain Values**: everything is `Serialize`, so front ends can persist
//!   results verbatim.

pub mod entities;
pub mod errors;
pub mod outcome;
pub mod pricing;
pub mod stats;

pub use entities::*;
pub use errors::*;
pub use outcome::*;
pub use pricing::*;
pub use stats::*;
