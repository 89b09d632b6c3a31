//! Comprehensive report and health scoring.

pub mod health;
pub mod report;

pub use health::{build_recommendations, compute_health, OverallHealth};
pub use report::{determine_environment, ComprehensiveReport, TestingEnvironment};
