//! Prometheus metrics for the Vault-Bench engines.
//!
//! All metrics follow the naming convention: `vb_<component>_<metric>_<unit>`
//!
//! Engines record into the statics directly; `register_metrics` exposes them
//! through the crate registry so `encode_metrics` can render them.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Instant;

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry for the engines.
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // FAN-OUT METRICS
    // =========================================================================

    /// Settled fan-out tasks by outcome
    pub static ref FANOUT_TASKS: CounterVec = CounterVec::new(
        Opts::new("vb_fanout_tasks_total", "Fan-out tasks settled, by outcome"),
        &["outcome"]  // outcome: success/failure/timeout/deadline/panic
    ).expect("metric creation failed");

    /// Latency of individual backend calls
    pub static ref BACKEND_CALL_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "vb_backend_call_duration_seconds",
            "Time spent waiting on a single backend call"
        ).buckets(exponential_buckets(0.001, 2.0, 16).expect("bucket layout")),
        &["operation"]
    ).expect("metric creation failed");

    /// Backends currently held by registries
    pub static ref REGISTERED_BACKENDS: Gauge = Gauge::new(
        "vb_registry_backends",
        "Number of backends currently registered"
    ).expect("metric creation failed");

    // =========================================================================
    // ENGINE METRICS
    // =========================================================================

    /// Load generator operations by type and outcome
    pub static ref LOAD_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("vb_load_operations_total", "Load generator operations"),
        &["operation", "outcome"]  // outcome: success/failure/timeout
    ).expect("metric creation failed");

    /// Vulnerabilities reported by the scan orchestrator
    pub static ref VULNERABILITIES_FOUND: CounterVec = CounterVec::new(
        Opts::new("vb_vulnerabilities_found_total", "Vulnerabilities reported by security scans"),
        &["severity"]
    ).expect("metric creation failed");

    /// Completed engine runs
    pub static ref ENGINE_RUNS: CounterVec = CounterVec::new(
        Opts::new("vb_engine_runs_total", "Completed engine runs"),
        &["engine"]  // engine: consistency/benchmark/load/vuln_scan/comprehensive
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered.
pub struct MetricsHandle {
    registry: Registry,
}

impl MetricsHandle {
    /// The registry holding every engine metric.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

/// Register all metrics with the crate registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Fan-out
        Box::new(FANOUT_TASKS.clone()),
        Box::new(BACKEND_CALL_DURATION.clone()),
        Box::new(REGISTERED_BACKENDS.clone()),
        // Engines
        Box::new(LOAD_OPERATIONS.clone()),
        Box::new(VULNERABILITIES_FOUND.clone()),
        Box::new(ENGINE_RUNS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: REGISTRY.clone(),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Observe the elapsed time of one backend call on drop.
pub struct CallTimer {
    operation: &'static str,
    start: Instant,
}

impl CallTimer {
    /// Start timing `operation`.
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        BACKEND_CALL_DURATION
            .with_label_values(&[self.operation])
            .observe(self.start.elapsed().as_secs_f64());
    }
}
