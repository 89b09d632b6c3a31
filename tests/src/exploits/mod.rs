//! # Attack Scenarios
//!
//! Each module weakens one protection on one backend of a mixed fleet and
//! checks that the scanner pins the finding on that backend alone.

pub mod concurrency;
pub mod cross_chain;
pub mod replay;
