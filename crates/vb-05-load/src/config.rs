//! Load generation configuration.

use crate::domain::LoadOperation;
use serde::{Deserialize, Serialize};
use shared_types::{ensure_positive, ConfigError};
use std::time::Duration;

/// Longest accepted run, and the longest pacing interval between a worker's
/// operations.
pub const MAX_TEST_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Percentage weights of each operation kind. Must sum to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionDistribution {
    pub create: u32,
    pub lock: u32,
    pub unlock: u32,
    pub verify: u32,
    pub multi_sig: u32,
    pub cross_chain: u32,
}

impl Default for TransactionDistribution {
    fn default() -> Self {
        Self {
            create: 10,
            lock: 25,
            unlock: 15,
            verify: 30,
            multi_sig: 10,
            cross_chain: 10,
        }
    }
}

impl TransactionDistribution {
    /// Every pick is `operation`.
    pub fn only(operation: LoadOperation) -> Self {
        let mut distribution = Self {
            create: 0,
            lock: 0,
            unlock: 0,
            verify: 0,
            multi_sig: 0,
            cross_chain: 0,
        };
        *distribution.weight_mut(operation) = 100;
        distribution
    }

    pub fn weight(&self, operation: LoadOperation) -> u32 {
        match operation {
            LoadOperation::Create => self.create,
            LoadOperation::Lock => self.lock,
            LoadOperation::Unlock => self.unlock,
            LoadOperation::Verify => self.verify,
            LoadOperation::MultiSig => self.multi_sig,
            LoadOperation::CrossChain => self.cross_chain,
        }
    }

    fn weight_mut(&mut self, operation: LoadOperation) -> &mut u32 {
        match operation {
            LoadOperation::Create => &mut self.create,
            LoadOperation::Lock => &mut self.lock,
            LoadOperation::Unlock => &mut self.unlock,
            LoadOperation::Verify => &mut self.verify,
            LoadOperation::MultiSig => &mut self.multi_sig,
            LoadOperation::CrossChain => &mut self.cross_chain,
        }
    }

    pub fn total(&self) -> u32 {
        LoadOperation::ALL.iter().map(|op| self.weight(*op)).sum()
    }

    /// Map a roll in `[0, 100)` onto the cumulative weights.
    pub fn pick(&self, roll: u32) -> LoadOperation {
        let mut cumulative = 0;
        for operation in LoadOperation::ALL {
            cumulative += self.weight(operation);
            if roll < cumulative {
                return operation;
            }
        }
        LoadOperation::CrossChain
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.total();
        if sum != 100 {
            return Err(ConfigError::InvalidDistribution { sum, expected: 100 });
        }
        Ok(())
    }
}

/// Load generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Number of concurrent workers.
    pub concurrent_transactions: usize,
    /// Wall-clock length of the run, setup included.
    pub test_duration_secs: u64,
    pub vaults_per_chain: usize,
    pub transaction_distribution: TransactionDistribution,
    /// Aggregate pacing target; unpaced when unset.
    pub target_tps: Option<f64>,
    pub operation_timeout_ms: u64,
    /// Upper bound (exclusive) of the random pause after each operation.
    pub max_jitter_ms: u64,
    /// Bound on connect and vault creation during setup.
    pub setup_timeout_ms: u64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            concurrent_transactions: 10,
            test_duration_secs: 10,
            vaults_per_chain: 3,
            transaction_distribution: TransactionDistribution::default(),
            target_tps: None,
            operation_timeout_ms: 10_000,
            max_jitter_ms: 50,
            setup_timeout_ms: 30_000,
        }
    }
}

impl LoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("concurrent_transactions", self.concurrent_transactions as u64)?;
        ensure_positive("test_duration_secs", self.test_duration_secs)?;
        ensure_positive("vaults_per_chain", self.vaults_per_chain as u64)?;
        ensure_positive("operation_timeout_ms", self.operation_timeout_ms)?;
        ensure_positive("setup_timeout_ms", self.setup_timeout_ms)?;
        if self.test_duration_secs > MAX_TEST_DURATION_SECS {
            return Err(ConfigError::OutOfRange {
                field: "test_duration_secs",
                value: self.test_duration_secs.to_string(),
                expected: "at most one week",
            });
        }
        if self.max_jitter_ms > MAX_TEST_DURATION_SECS * 1_000 {
            return Err(ConfigError::OutOfRange {
                field: "max_jitter_ms",
                value: self.max_jitter_ms.to_string(),
                expected: "at most one week",
            });
        }
        self.pacing_interval()?;
        self.transaction_distribution.validate()
    }

    /// Pause between one worker's operations that meets `target_tps` across
    /// all workers. `None` when unpaced.
    pub fn pacing_interval(&self) -> Result<Option<Duration>, ConfigError> {
        let Some(tps) = self.target_tps else {
            return Ok(None);
        };
        let out_of_range = || ConfigError::OutOfRange {
            field: "target_tps",
            value: tps.to_string(),
            expected: "positive finite rate, at least one operation per week",
        };
        if !tps.is_finite() || tps <= 0.0 {
            return Err(out_of_range());
        }
        let interval = Duration::try_from_secs_f64(self.concurrent_transactions as f64 / tps)
            .map_err(|_| out_of_range())?;
        if interval > Duration::from_secs(MAX_TEST_DURATION_SECS) {
            return Err(out_of_range());
        }
        Ok(Some(interval))
    }
}
