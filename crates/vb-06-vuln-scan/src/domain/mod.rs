//! Domain types of the vulnerability scan.

pub mod findings;
pub mod recommendations;

pub use findings::{
    ExploitationDifficulty, ImplementationComplexity, Priority, ProbeKind, Recommendation,
    ScanStatus, ScanSummary, Severity, TestResult, TestStatus, Vulnerability,
};
pub use recommendations::{build_recommendations, overall_status};
