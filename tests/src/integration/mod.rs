//! # Integration Tests
//!
//! Flows that cross engine boundaries, plus workspace-wide properties that
//! every engine must uphold.

pub mod flows;
pub mod properties;
pub mod scenarios;
