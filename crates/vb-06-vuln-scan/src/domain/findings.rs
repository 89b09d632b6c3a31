//! # Scan Findings
//!
//! Vulnerabilities, recommendations and per-probe test results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::BackendId;
use std::fmt;

/// Adversarial probes, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Replay,
    FrontRunning,
    AccessControlBypass,
    SignatureForging,
    RaceConditions,
    CrossChain,
    RpcManipulation,
}

impl ProbeKind {
    pub const ALL: [ProbeKind; 7] = [
        ProbeKind::Replay,
        ProbeKind::FrontRunning,
        ProbeKind::AccessControlBypass,
        ProbeKind::SignatureForging,
        ProbeKind::RaceConditions,
        ProbeKind::CrossChain,
        ProbeKind::RpcManipulation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeKind::Replay => "replay",
            ProbeKind::FrontRunning => "front_running",
            ProbeKind::AccessControlBypass => "access_control_bypass",
            ProbeKind::SignatureForging => "signature_forging",
            ProbeKind::RaceConditions => "race_conditions",
            ProbeKind::CrossChain => "cross_chain",
            ProbeKind::RpcManipulation => "rpc_manipulation",
        }
    }

    /// Prefix of test and vulnerability ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ProbeKind::Replay => "REPLAY",
            ProbeKind::FrontRunning => "FRONTRUN",
            ProbeKind::AccessControlBypass => "ACCESS",
            ProbeKind::SignatureForging => "SIGFORGE",
            ProbeKind::RaceConditions => "RACE",
            ProbeKind::CrossChain => "XCHAIN",
            ProbeKind::RpcManipulation => "RPC",
        }
    }

    pub fn test_name(&self) -> &'static str {
        match self {
            ProbeKind::Replay => "Transaction Replay Protection",
            ProbeKind::FrontRunning => "Front-Running Protection",
            ProbeKind::AccessControlBypass => "Timelock Access Control",
            ProbeKind::SignatureForging => "Signature Verification",
            ProbeKind::RaceConditions => "Concurrent Balance Accounting",
            ProbeKind::CrossChain => "Cross-Chain Sync Validation",
            ProbeKind::RpcManipulation => "RPC Response Integrity",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProbeKind::Replay => "Test if the system prevents transaction replay attacks",
            ProbeKind::FrontRunning => {
                "Test if one signer can approve a multi-sig request more than once"
            }
            ProbeKind::AccessControlBypass => {
                "Test if assets can be unlocked before the vault timelock expires"
            }
            ProbeKind::SignatureForging => "Test if tampered signatures or messages are accepted",
            ProbeKind::RaceConditions => {
                "Test if concurrent locks keep the vault balance consistent"
            }
            ProbeKind::CrossChain => "Test if vault sync targets are validated",
            ProbeKind::RpcManipulation => "Test if reads of unknown vault ids return data",
        }
    }

    pub fn component(&self) -> &'static str {
        match self {
            ProbeKind::Replay => "Transaction Processing",
            ProbeKind::FrontRunning => "Transaction Ordering",
            ProbeKind::AccessControlBypass => "Access Control",
            ProbeKind::SignatureForging => "Signature Verification",
            ProbeKind::RaceConditions => "Balance Accounting",
            ProbeKind::CrossChain => "Cross-Chain Bridge",
            ProbeKind::RpcManipulation => "RPC Layer",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExploitationDifficulty {
    Easy,
    Moderate,
    Difficult,
    VeryDifficult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub affected_components: Vec<String>,
    pub affected_backends: Vec<BackendId>,
    pub detection_method: String,
    pub exploitation_difficulty: ExploitationDifficulty,
    pub potential_impact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Immediate,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImplementationComplexity {
    Simple,
    Moderate,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub implementation_complexity: ImplementationComplexity,
    pub related_vulnerability_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Warning,
    Skipped,
}

/// Verdict of one probe against one backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_id: String,
    pub test_name: String,
    pub description: String,
    pub probe: ProbeKind,
    pub status: TestStatus,
    pub details: String,
    pub backend_id: Option<BackendId>,
    pub component_tested: String,
    pub duration_ms: u64,
    pub related_vulnerability_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Passed,
    Failed,
    Warning,
}

/// Result of `SecurityScanner::run_security_tests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub test_name: String,
    pub timestamp: DateTime<Utc>,
    pub overall_status: ScanStatus,
    pub passed_tests: usize,
    pub failed_tests: usize,
    pub warning_tests: usize,
    pub skipped_tests: usize,
    pub total_tests: usize,
    pub duration_ms: u64,
    pub vulnerabilities: Vec<Vulnerability>,
    pub recommendations: Vec<Recommendation>,
    /// Probe order, then backend order.
    pub results: Vec<TestResult>,
    pub vaults_created: usize,
    /// Backends without a single scan vault after setup.
    pub excluded_backends: Vec<BackendId>,
}

impl ScanSummary {
    /// Share of passed tests among all tests; 1 when nothing ran.
    pub fn pass_rate(&self) -> f64 {
        if self.total_tests == 0 {
            1.0
        } else {
            self.passed_tests as f64 / self.total_tests as f64
        }
    }

    pub fn count_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }

    pub fn results_for(&self, probe: ProbeKind) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(move |r| r.probe == probe)
    }
}
