//! Per-worker aggregation buffer, merged once the workers finish.

use super::result::{BackendLoadStats, LoadOperation, LoadPhase, OperationError};
use chrono::Utc;
use shared_types::{BackendId, ErrorCode, OperationOutcome};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct LoadTally {
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub per_backend: BTreeMap<BackendId, BackendLoadStats>,
    /// Latency of every call that returned.
    pub latencies: Vec<u64>,
    pub errors: Vec<OperationError>,
}

impl LoadTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one settled operation.
    ///
    /// `returned` is false for timeouts and transport errors, which carry
    /// no latency sample.
    pub fn record(
        &mut self,
        outcome: &OperationOutcome,
        returned: bool,
        operation: LoadOperation,
        phase: LoadPhase,
        vault_id: Option<&str>,
    ) {
        self.total += 1;
        let stats = self
            .per_backend
            .entry(outcome.backend_id.clone())
            .or_default();
        stats.total += 1;
        if returned {
            self.latencies.push(outcome.latency_ms);
        }

        if outcome.succeeded {
            self.succeeded += 1;
            stats.succeeded += 1;
            return;
        }

        self.failed += 1;
        stats.failed += 1;
        self.errors.push(OperationError {
            backend_id: outcome.backend_id.clone(),
            operation,
            phase,
            error_code: outcome.error_code.unwrap_or(ErrorCode::Exception),
            message: outcome
                .error_message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
            timestamp: Utc::now(),
            vault_id: vault_id.map(str::to_string),
        });
    }

    /// Ensure `backend_id` appears in the per-backend table.
    pub fn track(&mut self, backend_id: &BackendId) {
        self.per_backend.entry(backend_id.clone()).or_default();
    }

    pub fn merge(&mut self, other: LoadTally) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        for (id, stats) in other.per_backend {
            let entry = self.per_backend.entry(id).or_default();
            entry.total += stats.total;
            entry.succeeded += stats.succeeded;
            entry.failed += stats.failed;
        }
        self.latencies.extend(other.latencies);
        self.errors.extend(other.errors);
    }
}
