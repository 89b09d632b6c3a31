//! # Consistency Report
//!
//! Per-vault verdict assembled from the outcomes of one verification run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{BackendId, ErrorCode, IntegrityReport, OutcomePayload, VaultInfo};
use std::fmt;

/// Severity of a detected inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InconsistencySeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Vault field compared across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyField {
    Owner,
    Beneficiaries,
    Balance,
    Status,
    Metadata,
}

impl ConsistencyField {
    pub const ALL: [ConsistencyField; 5] = [
        ConsistencyField::Owner,
        ConsistencyField::Beneficiaries,
        ConsistencyField::Balance,
        ConsistencyField::Status,
        ConsistencyField::Metadata,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyField::Owner => "owner",
            ConsistencyField::Beneficiaries => "beneficiaries",
            ConsistencyField::Balance => "balance",
            ConsistencyField::Status => "status",
            ConsistencyField::Metadata => "metadata",
        }
    }
}

impl fmt::Display for ConsistencyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field consistency flags. A field stays `true` unless a mismatch was
/// found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConsistency {
    pub owner: bool,
    pub beneficiaries: bool,
    pub balance: bool,
    pub status: bool,
    pub metadata: bool,
}

impl Default for FieldConsistency {
    fn default() -> Self {
        Self {
            owner: true,
            beneficiaries: true,
            balance: true,
            status: true,
            metadata: true,
        }
    }
}

impl FieldConsistency {
    pub fn get(&self, field: ConsistencyField) -> bool {
        match field {
            ConsistencyField::Owner => self.owner,
            ConsistencyField::Beneficiaries => self.beneficiaries,
            ConsistencyField::Balance => self.balance,
            ConsistencyField::Status => self.status,
            ConsistencyField::Metadata => self.metadata,
        }
    }

    pub fn set(&mut self, field: ConsistencyField, consistent: bool) {
        let slot = match field {
            ConsistencyField::Owner => &mut self.owner,
            ConsistencyField::Beneficiaries => &mut self.beneficiaries,
            ConsistencyField::Balance => &mut self.balance,
            ConsistencyField::Status => &mut self.status,
            ConsistencyField::Metadata => &mut self.metadata,
        };
        *slot = consistent;
    }
}

/// A field whose value differs across backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inconsistency {
    pub field: ConsistencyField,
    pub severity: InconsistencySeverity,
    /// Backends that differ from the reference, in input order.
    pub affected_backends: Vec<BackendId>,
    pub description: String,
    pub possible_cause: String,
}

/// Verification result of one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendVerification {
    pub backend_id: BackendId,
    pub display_name: String,
    /// Call returned and the vault is intact.
    pub succeeded: bool,
    pub response_time_ms: u64,
    pub integrity: Option<IntegrityReport>,
    pub vault_info: Option<VaultInfo>,
    pub error_code: Option<ErrorCode>,
    pub error_message: Option<String>,
}

/// Result of `ConsistencyVerifier::verify_across_backends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub vault_id: String,
    pub timestamp: DateTime<Utc>,
    pub verification_success: bool,
    /// In input order.
    pub backend_results: Vec<BackendVerification>,
    /// 0-100.
    pub consistency_score: u8,
    pub data_consistency: FieldConsistency,
    pub inconsistencies: Vec<Inconsistency>,
    pub recommended_actions: Vec<String>,
    pub execution_time_ms: u64,
}

impl ConsistencyReport {
    pub fn successful_backends(&self) -> impl Iterator<Item = &BackendVerification> {
        self.backend_results.iter().filter(|r| r.succeeded)
    }

    pub fn failed_backends(&self) -> impl Iterator<Item = &BackendVerification> {
        self.backend_results.iter().filter(|r| !r.succeeded)
    }
}

/// Integrity report plus vault view fetched from one backend.
#[derive(Debug, Clone, Serialize)]
pub struct VaultSnapshot {
    pub integrity: IntegrityReport,
    pub info: VaultInfo,
}

impl OutcomePayload for VaultSnapshot {
    fn rejection(&self) -> Option<(ErrorCode, String)> {
        self.integrity.rejection()
    }
}
