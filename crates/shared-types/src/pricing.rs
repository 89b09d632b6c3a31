//! # Exchange Rates
//!
//! Native-currency to USD conversion used for cost reporting and for
//! sizing simulated vault values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ConfigError;

/// Rate used for currencies missing from the table.
pub const UNKNOWN_CURRENCY_RATE: f64 = 1.0;

/// USD price per unit of native currency, keyed by currency symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates(pub BTreeMap<String, f64>);

impl Default for ExchangeRates {
    fn default() -> Self {
        Self(BTreeMap::from([
            ("ETH".to_string(), 3000.0),
            ("SOL".to_string(), 100.0),
            ("TON".to_string(), 5.0),
            ("BTC".to_string(), 50000.0),
            ("ARB".to_string(), 1.2),
        ]))
    }
}

impl ExchangeRates {
    /// USD per unit of `currency`; unknown symbols map to 1.0.
    pub fn rate(&self, currency: &str) -> f64 {
        self.0
            .get(currency)
            .copied()
            .unwrap_or(UNKNOWN_CURRENCY_RATE)
    }

    pub fn to_usd(&self, amount: f64, currency: &str) -> f64 {
        amount * self.rate(currency)
    }

    pub fn to_native(&self, usd: f64, currency: &str) -> f64 {
        usd / self.rate(currency)
    }

    /// Every rate must be positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (symbol, rate) in &self.0 {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "exchange_rates",
                    value: format!("{}={}", symbol, rate),
                    expected: "positive finite rate",
                });
            }
        }
        Ok(())
    }
}
