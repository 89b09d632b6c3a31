//! # VB-06 Vulnerability Scan
//!
//! Adversarial probes against vault backends. Each probe attacks every
//! backend that received a timelocked scan vault and reports whether the
//! attack was refused.
//!
//! ## Probes
//!
//! | Probe | Attack | Reported as |
//! |-------|--------|-------------|
//! | replay | identical lock submitted twice | high |
//! | front_running | same signer approves one request twice concurrently | medium |
//! | access_control_bypass | unlock before the timelock expires | critical |
//! | signature_forging | tampered signature or message verified | critical |
//! | race_conditions | concurrent locks, balance compared after | high |
//! | cross_chain | sync to an unregistered backend id | high |
//! | rpc_manipulation | read of unknown and malformed vault ids | medium |
//!
//! **Architecture:** Hexagonal. Probes implement the `Probe` port; the
//! scanner only sees `DynProbe` values and can be given replacements.

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod ports;
pub mod probes;
pub mod service;

pub use config::{IncludeTests, SecurityScanConfig};
pub use domain::{
    ExploitationDifficulty, ImplementationComplexity, Priority, ProbeKind, Recommendation,
    ScanStatus, ScanSummary, Severity, TestResult, TestStatus, Vulnerability,
};
pub use ports::{DynProbe, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
pub use service::SecurityScanner;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
