//! Security scan configuration.

use crate::domain::ProbeKind;
use serde::{Deserialize, Serialize};
use shared_types::{ensure_positive, ConfigError};

/// Probes enabled for a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeTests {
    pub replay: bool,
    pub front_running: bool,
    pub access_control_bypass: bool,
    pub signature_forging: bool,
    pub race_conditions: bool,
    pub cross_chain: bool,
    pub rpc_manipulation: bool,
}

impl Default for IncludeTests {
    fn default() -> Self {
        Self {
            replay: true,
            front_running: true,
            access_control_bypass: true,
            signature_forging: true,
            race_conditions: true,
            cross_chain: true,
            rpc_manipulation: true,
        }
    }
}

impl IncludeTests {
    /// Enable a single probe.
    pub fn only(kind: ProbeKind) -> Self {
        let mut include = Self {
            replay: false,
            front_running: false,
            access_control_bypass: false,
            signature_forging: false,
            race_conditions: false,
            cross_chain: false,
            rpc_manipulation: false,
        };
        match kind {
            ProbeKind::Replay => include.replay = true,
            ProbeKind::FrontRunning => include.front_running = true,
            ProbeKind::AccessControlBypass => include.access_control_bypass = true,
            ProbeKind::SignatureForging => include.signature_forging = true,
            ProbeKind::RaceConditions => include.race_conditions = true,
            ProbeKind::CrossChain => include.cross_chain = true,
            ProbeKind::RpcManipulation => include.rpc_manipulation = true,
        }
        include
    }

    pub fn includes(&self, kind: ProbeKind) -> bool {
        match kind {
            ProbeKind::Replay => self.replay,
            ProbeKind::FrontRunning => self.front_running,
            ProbeKind::AccessControlBypass => self.access_control_bypass,
            ProbeKind::SignatureForging => self.signature_forging,
            ProbeKind::RaceConditions => self.race_conditions,
            ProbeKind::CrossChain => self.cross_chain,
            ProbeKind::RpcManipulation => self.rpc_manipulation,
        }
    }

    /// Enabled probes in execution order.
    pub fn enabled(&self) -> Vec<ProbeKind> {
        ProbeKind::ALL
            .into_iter()
            .filter(|kind| self.includes(*kind))
            .collect()
    }
}

/// Vulnerability scan configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityScanConfig {
    /// Bound on one probe against one backend.
    pub test_timeout_ms: u64,
    /// Attempts for each probe setup call.
    pub max_attempts: u32,
    /// Timelocked vaults created per backend during setup.
    pub target_vaults: usize,
    pub include_tests: IncludeTests,
    /// Run enabled probes concurrently instead of one after another.
    pub concurrent_tests: bool,
    /// Concurrent submissions of the race-condition probe.
    pub race_width: usize,
    /// Timelock applied to scan vaults.
    pub vault_timelock_secs: u64,
}

impl Default for SecurityScanConfig {
    fn default() -> Self {
        Self {
            test_timeout_ms: 30_000,
            max_attempts: 3,
            target_vaults: 1,
            include_tests: IncludeTests::default(),
            concurrent_tests: false,
            race_width: 5,
            vault_timelock_secs: 30 * 86_400,
        }
    }
}

impl SecurityScanConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("test_timeout_ms", self.test_timeout_ms)?;
        ensure_positive("max_attempts", self.max_attempts as u64)?;
        ensure_positive("target_vaults", self.target_vaults as u64)?;
        ensure_positive("vault_timelock_secs", self.vault_timelock_secs)?;
        if self.race_width < 2 {
            return Err(ConfigError::OutOfRange {
                field: "race_width",
                value: self.race_width.to_string(),
                expected: "at least 2 concurrent submissions",
            });
        }
        Ok(())
    }
}
