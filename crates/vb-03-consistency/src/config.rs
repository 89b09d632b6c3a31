//! Consistency verification configuration.

use serde::{Deserialize, Serialize};
use shared_types::{ensure_positive, ConfigError};

/// Fields compared across backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyChecks {
    pub owner: bool,
    pub beneficiaries: bool,
    pub balance: bool,
    pub status: bool,
    pub metadata: bool,
}

impl Default for ConsistencyChecks {
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

impl ConsistencyChecks {
    /// Disable every field comparison.
    pub fn none() -> Self {
        Self {
            owner: false,
            beneficiaries: false,
            balance: false,
            status: false,
            metadata: false,
        }
    }

    pub fn enabled_count(&self) -> usize {
        [
            self.owner,
            self.beneficiaries,
            self.balance,
            self.status,
            self.metadata,
        ]
        .iter()
        .filter(|enabled| **enabled)
        .count()
    }
}

/// Consistency engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// Bound on one backend's whole verification, retries included.
    pub timeout_ms: u64,
    /// Extra attempts after a failed backend call.
    pub max_retries: u32,
    pub consistency_checks: ConsistencyChecks,
    /// Any failed backend fails the verification.
    pub require_all_backends: bool,
    /// Responses slower than this are flagged in recommendations.
    pub slow_response_ms: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 3,
            consistency_checks: ConsistencyChecks::default(),
            require_all_backends: false,
            slow_response_ms: 5_000,
        }
    }
}

impl ConsistencyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("timeout_ms", self.timeout_ms)?;
        ensure_positive("slow_response_ms", self.slow_response_ms)?;
        Ok(())
    }
}
