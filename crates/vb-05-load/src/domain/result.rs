//! # Load Test Results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{BackendId, ErrorCode, LatencyPercentiles};
use std::collections::BTreeMap;
use std::fmt;

/// Operation kinds the workers pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOperation {
    Create,
    Lock,
    Unlock,
    Verify,
    MultiSig,
    CrossChain,
}

impl LoadOperation {
    /// Order of the cumulative distribution.
    pub const ALL: [LoadOperation; 6] = [
        LoadOperation::Create,
        LoadOperation::Lock,
        LoadOperation::Unlock,
        LoadOperation::Verify,
        LoadOperation::MultiSig,
        LoadOperation::CrossChain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadOperation::Create => "create",
            LoadOperation::Lock => "lock",
            LoadOperation::Unlock => "unlock",
            LoadOperation::Verify => "verify",
            LoadOperation::MultiSig => "multi_sig",
            LoadOperation::CrossChain => "cross_chain",
        }
    }
}

impl fmt::Display for LoadOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of the run an operation belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    Setup,
    SteadyState,
}

/// A failed operation. Business failures and exceptions share this list
/// and are told apart by `error_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationError {
    pub backend_id: BackendId,
    pub operation: LoadOperation,
    pub phase: LoadPhase,
    pub error_code: ErrorCode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub vault_id: Option<String>,
}

/// Counts for one backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendLoadStats {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl BackendLoadStats {
    /// Failed share in `[0, 1]`; 0 without operations.
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64
        }
    }
}

/// Result of `LoadGenerator::run_concurrency_test`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadTestResult {
    pub total_operations: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub per_backend: BTreeMap<BackendId, BackendLoadStats>,
    pub average_latency_ms: f64,
    pub percentiles: LatencyPercentiles,
    /// Operations per second over the whole run.
    pub throughput_ops: f64,
    pub elapsed_ms: u64,
    pub vaults_created: usize,
    /// Backends without a single test vault after setup.
    pub excluded_backends: Vec<BackendId>,
    pub errors: Vec<OperationError>,
}

impl LoadTestResult {
    /// Succeeded share in `[0, 1]`; 0 without operations.
    pub fn success_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            self.succeeded as f64 / self.total_operations as f64
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.total_operations == 0 {
            0.0
        } else {
            self.failed as f64 / self.total_operations as f64
        }
    }

    pub fn errors_with(&self, code: ErrorCode) -> impl Iterator<Item = &OperationError> {
        self.errors.iter().filter(move |e| e.error_code == code)
    }
}
