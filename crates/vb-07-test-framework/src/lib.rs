//! # VB-07 Test Framework
//!
//! Facade over every engine. `TestFramework` resolves backends from an
//! injected `BackendRegistry`, runs the requested sub-runs and folds them
//! into a `ComprehensiveReport` with overall health scores.
//!
//! ## Module Structure
//!
//! ```text
//! vb-07-test-framework/
//! ├── config.rs        # FrameworkConfig, from_json
//! ├── error.rs         # FrameworkError
//! ├── domain/          # health scoring, ComprehensiveReport
//! ├── provisioning/    # EnvironmentProvisioner
//! └── service.rs       # TestFramework
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod error;
pub mod provisioning;
pub mod service;

pub use config::FrameworkConfig;
pub use domain::{
    build_recommendations, compute_health, determine_environment, ComprehensiveReport,
    OverallHealth, TestingEnvironment,
};
pub use error::{FrameworkError, FrameworkResult};
pub use provisioning::{
    EnvironmentConfig, EnvironmentProvisioner, ProvisionedEnvironment, ProvisionedVault,
    SecurityLevelDistribution, TestWallet,
};
pub use service::TestFramework;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
