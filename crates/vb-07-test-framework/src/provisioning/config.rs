//! Provisioning configuration.

use serde::{Deserialize, Serialize};
use shared_types::{ensure_positive, BackendId, ConfigError, ExchangeRates, SecurityLevel};
use std::collections::BTreeMap;

/// Percentages of vaults per security level. Must sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityLevelDistribution {
    pub standard: u32,
    pub enhanced: u32,
    pub maximum: u32,
}

impl Default for SecurityLevelDistribution {
    fn default() -> Self {
        Self {
            standard: 60,
            enhanced: 30,
            maximum: 10,
        }
    }
}

impl SecurityLevelDistribution {
    /// Map a roll in `[0, 100)` onto the cumulative distribution.
    pub fn pick(&self, roll: f64) -> SecurityLevel {
        if roll < f64::from(self.standard) {
            SecurityLevel::Standard
        } else if roll < f64::from(self.standard + self.enhanced) {
            SecurityLevel::Enhanced
        } else {
            SecurityLevel::Maximum
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.standard + self.enhanced + self.maximum;
        if sum != 100 {
            return Err(ConfigError::InvalidDistribution { sum, expected: 100 });
        }
        Ok(())
    }
}

/// Environment provisioning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub name: String,
    pub wallet_count: usize,
    pub vaults_per_wallet: usize,
    pub min_vault_value_usd: f64,
    pub max_vault_value_usd: f64,
    /// Lifetime of the environment.
    pub duration_days: u32,
    pub vault_timelock_secs: u64,
    pub security_level_distribution: SecurityLevelDistribution,
    /// Percentage of wallets per backend. Unlisted backends get none; an
    /// empty map spreads wallets evenly.
    pub backend_distribution: BTreeMap<BackendId, f64>,
    /// Vaults above this simulated value hold `simulated_vault_balance`
    /// instead of their full native amount.
    pub high_value_threshold_usd: f64,
    pub simulated_vault_balance: f64,
    pub exchange_rates: ExchangeRates,
    pub call_timeout_ms: u64,
    /// Fixed RNG seed for reproducible values.
    pub seed: Option<u64>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: "Enterprise Test Environment".to_string(),
            wallet_count: 10,
            vaults_per_wallet: 2,
            min_vault_value_usd: 1_000.0,
            max_vault_value_usd: 100_000.0,
            duration_days: 30,
            vault_timelock_secs: 30 * 86_400,
            security_level_distribution: SecurityLevelDistribution::default(),
            backend_distribution: BTreeMap::new(),
            high_value_threshold_usd: 10_000.0,
            simulated_vault_balance: 0.01,
            exchange_rates: ExchangeRates::default(),
            call_timeout_ms: 30_000,
            seed: None,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("wallet_count", self.wallet_count as u64)?;
        ensure_positive("vaults_per_wallet", self.vaults_per_wallet as u64)?;
        ensure_positive("duration_days", u64::from(self.duration_days))?;
        ensure_positive("call_timeout_ms", self.call_timeout_ms)?;
        if !(self.min_vault_value_usd >= 0.0 && self.min_vault_value_usd <= self.max_vault_value_usd)
        {
            return Err(ConfigError::OutOfRange {
                field: "min_vault_value_usd",
                value: format!("{}..{}", self.min_vault_value_usd, self.max_vault_value_usd),
                expected: "0 <= min <= max",
            });
        }
        if let Some((id, pct)) = self
            .backend_distribution
            .iter()
            .find(|(_, pct)| !pct.is_finite() || **pct < 0.0)
        {
            return Err(ConfigError::OutOfRange {
                field: "backend_distribution",
                value: format!("{}={}", id, pct),
                expected: "non-negative percentage",
            });
        }
        self.security_level_distribution.validate()?;
        self.exchange_rates.validate()
    }
}
