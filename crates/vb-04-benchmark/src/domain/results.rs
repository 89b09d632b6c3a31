//! # Benchmark Results
//!
//! Per-operation measurements, per-backend scores and the run report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::BackendId;
use std::collections::BTreeMap;
use std::fmt;

/// Operation kinds of the benchmark battery, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkOperation {
    /// `create_vault`
    Create,
    /// `get_vault_info`
    Read,
    /// `add_beneficiary`
    Update,
    /// `remove_beneficiary`
    Delete,
    /// `get_balance`
    Query,
}

impl BenchmarkOperation {
    pub const ALL: [BenchmarkOperation; 5] = [
        BenchmarkOperation::Create,
        BenchmarkOperation::Read,
        BenchmarkOperation::Update,
        BenchmarkOperation::Delete,
        BenchmarkOperation::Query,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkOperation::Create => "create",
            BenchmarkOperation::Read => "read",
            BenchmarkOperation::Update => "update",
            BenchmarkOperation::Delete => "delete",
            BenchmarkOperation::Query => "query",
        }
    }
}

impl fmt::Display for BenchmarkOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurements of one operation kind on one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationBenchmark {
    pub operation: BenchmarkOperation,
    pub total_ops: usize,
    pub success_count: usize,
    pub fail_count: usize,
    pub avg_latency_ms: f64,
    pub p50_latency_ms: u64,
    pub p90_latency_ms: u64,
    pub p99_latency_ms: u64,
    /// Mean fee over successful costed calls.
    pub avg_cost_native: f64,
    pub avg_cost_usd: f64,
    /// Total ops per wall-clock second.
    pub throughput_tps: f64,
}

/// Op-count weighted aggregates over a backend's operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendAverages {
    pub confirmation_time_ms: f64,
    pub cost_usd: f64,
    /// Percent, 0-100.
    pub success_rate: f64,
    pub throughput_tps: f64,
}

/// Scores in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkScores {
    pub performance: u8,
    pub reliability: u8,
    pub cost_efficiency: u8,
    pub overall: u8,
}

/// Benchmark result of one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendBenchmark {
    pub backend_id: BackendId,
    pub display_name: String,
    pub native_currency: String,
    /// In battery order.
    pub operations: Vec<OperationBenchmark>,
    pub averages: BackendAverages,
    pub scores: BenchmarkScores,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

impl BackendBenchmark {
    pub fn operation(&self, operation: BenchmarkOperation) -> Option<&OperationBenchmark> {
        self.operations.iter().find(|o| o.operation == operation)
    }

    pub fn total_successes(&self) -> usize {
        self.operations.iter().map(|o| o.success_count).sum()
    }
}

/// Best backend per score. `None` only when nothing was scored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rankings {
    pub fastest: Option<BackendId>,
    pub most_reliable: Option<BackendId>,
    pub most_cost_effective: Option<BackendId>,
    pub best_overall: Option<BackendId>,
}

/// Backend excluded from the battery during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBackend {
    pub backend_id: BackendId,
    pub reason: String,
}

/// Result of `BenchmarkEngine::run_benchmarks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: DateTime<Utc>,
    /// Scored backends in registration order.
    pub per_backend: Vec<BackendBenchmark>,
    pub rankings: Rankings,
    pub recommendations: BTreeMap<BackendId, Vec<String>>,
    pub overall_recommendations: Vec<String>,
    pub skipped: Vec<SkippedBackend>,
    pub duration_ms: u64,
}

impl BenchmarkReport {
    pub fn backend(&self, id: &BackendId) -> Option<&BackendBenchmark> {
        self.per_backend.iter().find(|b| &b.backend_id == id)
    }
}
