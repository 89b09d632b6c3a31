//! # Vault-Bench Telemetry
//!
//! Logging and metrics bootstrap shared by every engine crate.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vb_telemetry::{init_logging, register_metrics, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_logging(&config)?;
//! let _metrics = register_metrics()?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VB_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `VB_JSON_LOGS` | `false` | JSON log output |
//! | `VB_ENVIRONMENT` | unset | development / staging / production |

mod config;
mod logging;
pub mod metrics;

pub use config::{DeploymentEnvironment, TelemetryConfig};
pub use logging::{init_logging, init_test_logging};
pub use metrics::{
    encode_metrics, register_metrics, CallTimer, MetricsHandle, BACKEND_CALL_DURATION,
    ENGINE_RUNS, FANOUT_TASKS, LOAD_OPERATIONS, REGISTERED_BACKENDS, VULNERABILITIES_FOUND,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}
