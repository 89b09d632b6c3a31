//! Domain types of the load generator.

pub mod result;
pub mod tally;

pub use result::{BackendLoadStats, LoadOperation, LoadPhase, LoadTestResult, OperationError};
pub use tally::LoadTally;
