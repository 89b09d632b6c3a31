//! # Ports
//!
//! The interface every adversarial probe implements.

pub mod probe;

pub use probe::{retry, DynProbe, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
