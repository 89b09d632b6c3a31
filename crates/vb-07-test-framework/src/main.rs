//! # vault-bench
//!
//! Runs a comprehensive test against a simulated fleet and prints the report
//! as JSON.
//!
//! ```text
//! vault-bench [config.json]
//! ```
//!
//! Without a config file a short load test and a full security scan run.
//! Set `VB_PRINT_METRICS=1` to dump Prometheus metrics to stderr afterwards.

use anyhow::{Context, Result};
use shared_types::BackendId;
use std::sync::Arc;
use tracing::info;
use vb_01_backend::{simulated_fleet, BackendRegistry, SimulationProfile};
use vb_05_load::LoadConfig;
use vb_06_vuln_scan::SecurityScanConfig;
use vb_07_test_framework::{FrameworkConfig, TestFramework};
use vb_telemetry::{encode_metrics, init_logging, register_metrics, TelemetryConfig};

fn load_config() -> Result<FrameworkConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            FrameworkConfig::from_json(&json).context("Invalid framework configuration")
        }
        None => Ok(FrameworkConfig {
            load: Some(LoadConfig {
                test_duration_secs: 5,
                ..Default::default()
            }),
            security: Some(SecurityScanConfig::default()),
            ..Default::default()
        }),
    }
}

fn simulated_registry() -> Arc<BackendRegistry> {
    let registry = Arc::new(BackendRegistry::new());
    let fleet = simulated_fleet([
        (BackendId::from("ethereum"), SimulationProfile::ethereum()),
        (BackendId::from("arbitrum"), SimulationProfile::arbitrum()),
        (BackendId::from("solana"), SimulationProfile::solana()),
        (BackendId::from("ton"), SimulationProfile::ton()),
        (BackendId::from("bitcoin"), SimulationProfile::bitcoin()),
    ]);
    for backend in fleet {
        registry.register(backend);
    }
    registry
}

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_logging(&telemetry)?;
    register_metrics()?;

    let config = load_config()?;
    let framework = TestFramework::new(simulated_registry());
    info!("[Framework] vault-bench v{}", vb_07_test_framework::VERSION);

    let report = framework.run_comprehensive(&config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if std::env::var("VB_PRINT_METRICS").is_ok_and(|v| v == "1" || v == "true") {
        eprintln!("{}", encode_metrics()?);
    }
    Ok(())
}
