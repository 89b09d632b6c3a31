//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Deployment environment the engines report against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    Development,
    Staging,
    Production,
}

impl DeploymentEnvironment {
    /// Parse `development` / `staging` / `production` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "staging" => Some(Self::Staging),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }
}

/// Logging and metrics configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive.
    pub log_level: String,

    /// Whether to enable console output.
    pub console_output: bool,

    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,

    /// Declared deployment environment, if any.
    pub environment: Option<DeploymentEnvironment>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vault-bench".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VB_SERVICE_NAME`: Service name (default: vault-bench)
    /// - `VB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `VB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `VB_JSON_LOGS`: Enable JSON logs (default: false, true in containers)
    /// - `VB_ENVIRONMENT`: development / staging / production
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("VB_SERVICE_NAME")
                .unwrap_or_else(|_| "vault-bench".to_string()),

            log_level: env::var("VB_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("VB_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),

            json_logs: env::var("VB_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            environment: env::var("VB_ENVIRONMENT")
                .ok()
                .and_then(|v| DeploymentEnvironment::parse(&v)),
        }
    }
}
