//! # Operation Outcomes
//!
//! `OperationOutcome` is the atomic unit every fan-out call produces. All
//! aggregates (consistency reports, benchmark results, load results, scan
//! summaries) are derived from sets of outcomes.

use crate::entities::{BackendId, IntegrityReport, MultiSigStatus, TransactionReceipt, VaultInfo};
use crate::errors::BackendError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The per-call timeout elapsed.
    Timeout,
    /// The caller's overall deadline elapsed before the task settled.
    DeadlineExceeded,
    /// Explicit backend error, or the task panicked.
    Exception,
    /// The backend accepted the call but rejected the transaction.
    TxFailed,
    /// Vault creation was rejected during setup.
    CreationFailed,
    /// Integrity verification reported the vault as not intact.
    IntegrityFailed,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            ErrorCode::Exception => "EXCEPTION",
            ErrorCode::TxFailed => "TX_FAILED",
            ErrorCode::CreationFailed => "CREATION_FAILED",
            ErrorCode::IntegrityFailed => "INTEGRITY_FAILED",
        }
    }

    /// Timeout-class failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorCode::Timeout | ErrorCode::DeadlineExceeded)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub backend_id: BackendId,
    pub succeeded: bool,
    pub latency_ms: u64,
    pub cost_native: Option<f64>,
    pub cost_usd: Option<f64>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
    pub payload: Value,
}

impl OperationOutcome {
    /// Build an outcome from a settled backend call.
    pub fn from_result<T: OutcomePayload>(
        backend_id: BackendId,
        latency_ms: u64,
        result: &Result<T, BackendError>,
    ) -> Self {
        match result {
            Ok(value) => {
                let (succeeded, error_code, error_message) = match value.rejection() {
                    Some((code, message)) => (false, Some(code), Some(message)),
                    None => (true, None, None),
                };
                Self {
                    backend_id,
                    succeeded,
                    latency_ms,
                    cost_native: value.cost_native(),
                    cost_usd: None,
                    error_code,
                    error_message,
                    payload: value.payload(),
                }
            }
            Err(err) => Self::failed(backend_id, latency_ms, ErrorCode::Exception, err.to_string()),
        }
    }

    /// A failed outcome with an explicit code.
    pub fn failed(
        backend_id: BackendId,
        latency_ms: u64,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            backend_id,
            succeeded: false,
            latency_ms,
            cost_native: None,
            cost_usd: None,
            error_code: Some(code),
            error_message: Some(message.into()),
            payload: Value::Null,
        }
    }

    /// The per-call timeout elapsed.
    pub fn timed_out(backend_id: BackendId, timeout_ms: u64) -> Self {
        Self::failed(
            backend_id,
            timeout_ms,
            ErrorCode::Timeout,
            format!("No response within {}ms", timeout_ms),
        )
    }

    /// Convert the native cost into USD. A missing rate leaves `cost_usd` unset.
    pub fn with_usd_rate(mut self, rate: f64) -> Self {
        self.cost_usd = self.cost_native.map(|native| native * rate);
        self
    }

    /// Whether this outcome failed with a timeout-class code.
    pub fn is_timeout(&self) -> bool {
        self.error_code.map(|c| c.is_timeout()).unwrap_or(false)
    }
}

/// Typed values a backend call can produce.
///
/// Supplies the JSON payload, the native cost and the business-failure
/// classification of a successful call.
pub trait OutcomePayload: Serialize {
    /// JSON payload stored on the outcome.
    fn payload(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Fee paid in the backend's native currency.
    fn cost_native(&self) -> Option<f64> {
        None
    }

    /// `Some` when the backend answered but reported a business failure.
    fn rejection(&self) -> Option<(ErrorCode, String)> {
        None
    }
}

impl OutcomePayload for TransactionReceipt {
    fn cost_native(&self) -> Option<f64> {
        if self.success {
            self.fee_native
        } else {
            None
        }
    }

    fn rejection(&self) -> Option<(ErrorCode, String)> {
        if self.success {
            return None;
        }
        Some((
            ErrorCode::TxFailed,
            self.error_message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

impl OutcomePayload for IntegrityReport {
    fn rejection(&self) -> Option<(ErrorCode, String)> {
        if self.is_intact {
            return None;
        }
        let reason = self
            .alerts
            .first()
            .map(|a| a.message.clone())
            .unwrap_or_else(|| "Vault integrity check failed".to_string());
        Some((ErrorCode::IntegrityFailed, reason))
    }
}

impl OutcomePayload for VaultInfo {}
impl OutcomePayload for MultiSigStatus {}
impl OutcomePayload for HashMap<BackendId, IntegrityReport> {}
impl OutcomePayload for String {}
impl OutcomePayload for f64 {}
impl OutcomePayload for bool {}
impl OutcomePayload for () {}
