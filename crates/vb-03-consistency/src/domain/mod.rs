//! Domain types of the consistency engine.

pub mod report;

pub use report::{
    BackendVerification, ConsistencyField, ConsistencyReport, FieldConsistency, Inconsistency,
    InconsistencySeverity, VaultSnapshot,
};
