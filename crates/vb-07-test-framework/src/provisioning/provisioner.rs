//! Wallet allocation and vault creation.

use super::config::EnvironmentConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, BackendId, ConfigError, SecurityLevel, TransactionReceipt, VaultCreationParams,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vb_01_backend::DynBackend;
use vb_02_fanout::FanOutCoordinator;

/// Uniform samples averaged per simulated value.
const BELL_SAMPLES: u32 = 6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestWallet {
    pub backend_id: BackendId,
    pub address: Address,
    /// Native balance keyed by currency symbol.
    pub balances: BTreeMap<String, f64>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedVault {
    pub vault_id: String,
    pub name: String,
    pub backend_id: BackendId,
    pub owner_address: Address,
    pub simulated_value_usd: f64,
    /// Native equivalent of the simulated value.
    pub native_amount: f64,
    pub asset_type: String,
    pub security_level: SecurityLevel,
    pub unlock_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// The vault holds a token balance instead of `native_amount`.
    pub value_is_simulated: bool,
}

/// Result of `EnvironmentProvisioner::provision`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedEnvironment {
    pub id: String,
    pub name: String,
    pub wallets: Vec<TestWallet>,
    pub vaults: Vec<ProvisionedVault>,
    pub total_simulated_value_usd: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Wallets per backend, in backend order.
///
/// Percentages are normalized when they do not sum to 100; every backend
/// with a positive share gets at least one wallet.
pub fn allocate_wallets(
    backends: &[BackendId],
    distribution: &BTreeMap<BackendId, f64>,
    wallet_count: usize,
) -> Vec<(BackendId, usize)> {
    let shares: Vec<(BackendId, f64)> = if distribution.is_empty() {
        let even = 100.0 / backends.len().max(1) as f64;
        backends.iter().map(|id| (id.clone(), even)).collect()
    } else {
        backends
            .iter()
            .map(|id| (id.clone(), distribution.get(id).copied().unwrap_or(0.0)))
            .collect()
    };

    let total: f64 = shares.iter().map(|(_, pct)| pct).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    if (total - 100.0).abs() > 0.1 {
        warn!(
            total,
            "[Provisioning] Backend distribution does not sum to 100%, normalizing"
        );
    }

    shares
        .into_iter()
        .filter(|(_, pct)| *pct > 0.0)
        .map(|(id, pct)| {
            let normalized = pct / total * 100.0;
            let count = ((normalized / 100.0) * wallet_count as f64).round() as usize;
            (id, count.max(1))
        })
        .collect()
}

/// Bell-shaped value between `min` and `max`, rounded to cents.
fn simulated_value(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    let unit = (0..BELL_SAMPLES).map(|_| rng.gen::<f64>()).sum::<f64>() / f64::from(BELL_SAMPLES);
    ((min + unit * (max - min)) * 100.0).round() / 100.0
}

/// Provisions test environments on a set of backends.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentProvisioner {
    coordinator: FanOutCoordinator,
}

impl EnvironmentProvisioner {
    pub fn new(coordinator: FanOutCoordinator) -> Self {
        Self { coordinator }
    }

    /// Create wallets and vaults across `backends`.
    ///
    /// Backends provision concurrently. Failed wallet or vault creations are
    /// logged and left out of the environment.
    pub async fn provision(
        &self,
        backends: &[DynBackend],
        config: &EnvironmentConfig,
    ) -> Result<ProvisionedEnvironment, ConfigError> {
        config.validate()?;
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let created_at = Utc::now();
        let id = format!(
            "ENV-{}-{}",
            created_at.timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..5]
        );
        info!(
            environment = %id,
            wallets = config.wallet_count,
            "[Provisioning] Creating environment {}",
            config.name
        );

        let ids: Vec<BackendId> = backends.iter().map(|b| b.id().clone()).collect();
        let allocation = allocate_wallets(&ids, &config.backend_distribution, config.wallet_count);
        let plans = allocation.iter().enumerate().filter_map(|(index, (id, wallets))| {
            let backend = backends.iter().find(|b| b.id() == id)?.clone();
            let seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
            Some(self.provision_backend(backend, *wallets, config, seed))
        });
        let provisioned = join_all(plans).await;

        let mut wallets = Vec::new();
        let mut vaults = Vec::new();
        for (backend_wallets, backend_vaults) in provisioned {
            wallets.extend(backend_wallets);
            vaults.extend(backend_vaults);
        }
        let total_simulated_value_usd = vaults.iter().map(|v| v.simulated_value_usd).sum();

        info!(
            environment = %id,
            wallets = wallets.len(),
            vaults = vaults.len(),
            total_usd = total_simulated_value_usd,
            "[Provisioning] Environment ready"
        );
        Ok(ProvisionedEnvironment {
            id,
            name: config.name.clone(),
            wallets,
            vaults,
            total_simulated_value_usd,
            created_at,
            expires_at: created_at + ChronoDuration::days(i64::from(config.duration_days)),
        })
    }

    async fn provision_backend(
        &self,
        backend: DynBackend,
        wallet_count: usize,
        config: &EnvironmentConfig,
        seed: Option<u64>,
    ) -> (Vec<TestWallet>, Vec<ProvisionedVault>) {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let timeout = Duration::from_millis(config.call_timeout_ms);
        let currency = backend.native_currency().to_string();
        let id = backend.id().clone();

        let mut wallets = Vec::with_capacity(wallet_count);
        for index in 0..wallet_count {
            let connected = self.coordinator.measure(&id, timeout, backend.connect()).await;
            let Some(address) = connected.success_value().cloned() else {
                warn!(
                    backend = %id,
                    "[Provisioning] Wallet {} connect failed: {}",
                    index + 1,
                    connected.outcome.error_message.as_deref().unwrap_or("unknown")
                );
                continue;
            };
            let mut balances = BTreeMap::new();
            let balance = self
                .coordinator
                .measure(&id, timeout, backend.get_balance(&address))
                .await;
            match balance.success_value() {
                Some(amount) => {
                    balances.insert(currency.clone(), *amount);
                }
                None => warn!(backend = %id, %address, "[Provisioning] Balance read failed"),
            }
            wallets.push(TestWallet {
                backend_id: id.clone(),
                address,
                balances,
                label: format!("{} Test Wallet {}", backend.display_name(), index + 1),
            });
        }

        let mut vaults = Vec::new();
        for wallet in &wallets {
            for index in 0..config.vaults_per_wallet {
                let value = simulated_value(
                    &mut rng,
                    config.min_vault_value_usd,
                    config.max_vault_value_usd,
                );
                let security_level = config
                    .security_level_distribution
                    .pick(rng.gen_range(0.0..100.0));
                let native_amount = config.exchange_rates.to_native(value, &currency);
                let value_is_simulated = value > config.high_value_threshold_usd;
                let name = format!("Enterprise Vault {} - ${:.2}", index + 1, value);

                let params = VaultCreationParams {
                    owner_address: wallet.address.clone(),
                    name: name.clone(),
                    description: format!(
                        "Enterprise-grade vault with simulated value of ${:.2}",
                        value
                    ),
                    timelock_secs: Some(config.vault_timelock_secs),
                    security_level,
                    cross_chain_enabled: true,
                    initial_balance: if value_is_simulated {
                        config.simulated_vault_balance
                    } else {
                        native_amount
                    },
                    initial_asset_type: currency.clone(),
                    metadata: BTreeMap::from([
                        ("simulated_value_usd".to_string(), format!("{:.2}", value)),
                        ("value_is_simulated".to_string(), value_is_simulated.to_string()),
                    ]),
                    ..Default::default()
                };

                let created = self
                    .coordinator
                    .measure(&id, timeout, backend.create_vault(params))
                    .await;
                let vault_id = created
                    .success_value()
                    .and_then(|receipt: &TransactionReceipt| receipt.vault_id.clone());
                let Some(vault_id) = vault_id else {
                    warn!(
                        backend = %id,
                        "[Provisioning] Vault creation failed: {}",
                        created.outcome.error_message.as_deref().unwrap_or("unknown")
                    );
                    continue;
                };
                debug!(backend = %id, %vault_id, value, "[Provisioning] Vault created");

                let created_at = Utc::now();
                vaults.push(ProvisionedVault {
                    vault_id,
                    name,
                    backend_id: id.clone(),
                    owner_address: wallet.address.clone(),
                    simulated_value_usd: value,
                    native_amount,
                    asset_type: currency.clone(),
                    security_level,
                    unlock_at: created_at
                        + ChronoDuration::seconds(config.vault_timelock_secs as i64),
                    created_at,
                    value_is_simulated,
                });
            }
        }
        (wallets, vaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vb_01_backend::{FaultMode, SimulatedBackend, SimulatedOp, SimulationProfile};

    fn ids(names: &[&str]) -> Vec<BackendId> {
        names.iter().map(|n| BackendId::from(*n)).collect()
    }

    #[test]
    fn test_allocation_follows_percentages() {
        let distribution = BTreeMap::from([
            (BackendId::from("eth"), 50.0),
            (BackendId::from("sol"), 30.0),
            (BackendId::from("ton"), 20.0),
        ]);
        let allocation = allocate_wallets(&ids(&["eth", "sol", "ton"]), &distribution, 10);
        let counts: Vec<usize> = allocation.iter().map(|(_, n)| *n).collect();
        assert_eq!(counts, vec![5, 3, 2]);
    }

    #[test]
    fn test_allocation_normalizes_and_floors_at_one() {
        let distribution = BTreeMap::from([
            (BackendId::from("eth"), 2.0),
            (BackendId::from("sol"), 0.02),
        ]);
        let allocation = allocate_wallets(&ids(&["eth", "sol", "btc"]), &distribution, 10);
        assert_eq!(
            allocation,
            vec![(BackendId::from("eth"), 10), (BackendId::from("sol"), 1)]
        );
    }

    #[test]
    fn test_allocation_even_when_unspecified() {
        let allocation = allocate_wallets(&ids(&["eth", "sol"]), &BTreeMap::new(), 4);
        assert_eq!(
            allocation,
            vec![(BackendId::from("eth"), 2), (BackendId::from("sol"), 2)]
        );
    }

    #[test]
    fn test_simulated_value_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let value = simulated_value(&mut rng, 1_000.0, 5_000.0);
            assert!((1_000.0..=5_000.0).contains(&value));
            assert_eq!((value * 100.0).round() / 100.0, value);
        }
    }

    #[tokio::test]
    async fn test_provision_creates_wallets_and_vaults() {
        let backends: Vec<DynBackend> = vec![
            Arc::new(SimulatedBackend::new("eth", SimulationProfile::default())),
            Arc::new(SimulatedBackend::new(
                "sol",
                SimulationProfile::solana().with_latency(1, 2),
            )),
        ];
        let config = EnvironmentConfig {
            wallet_count: 4,
            vaults_per_wallet: 2,
            min_vault_value_usd: 20_000.0,
            max_vault_value_usd: 30_000.0,
            seed: Some(1),
            ..Default::default()
        };

        let env = EnvironmentProvisioner::default()
            .provision(&backends, &config)
            .await
            .unwrap();

        assert_eq!(env.wallets.len(), 4);
        assert_eq!(env.vaults.len(), 8);
        assert!(env.vaults.iter().all(|v| v.value_is_simulated));
        let sum: f64 = env.vaults.iter().map(|v| v.simulated_value_usd).sum();
        assert!((env.total_simulated_value_usd - sum).abs() < 1e-6);
        assert_eq!((env.expires_at - env.created_at).num_days(), 30);
        assert_eq!(env.wallets[0].balances.get("ETH"), Some(&10.0));

        let sol_vault = env.vaults.iter().find(|v| v.backend_id.as_str() == "sol").unwrap();
        let expected = sol_vault.simulated_value_usd / 100.0;
        assert!((sol_vault.native_amount - expected).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failed_backend_is_skipped() {
        let backends: Vec<DynBackend> = vec![
            Arc::new(SimulatedBackend::new("eth", SimulationProfile::default())),
            Arc::new(SimulatedBackend::new(
                "down",
                SimulationProfile::default().with_fault(SimulatedOp::Connect, FaultMode::Fail),
            )),
        ];
        let config = EnvironmentConfig {
            wallet_count: 2,
            vaults_per_wallet: 1,
            ..Default::default()
        };

        let env = EnvironmentProvisioner::default()
            .provision(&backends, &config)
            .await
            .unwrap();

        assert_eq!(env.wallets.len(), 1);
        assert!(env.wallets.iter().all(|w| w.backend_id.as_str() == "eth"));
        assert_eq!(env.vaults.len(), 1);
    }
}
