//! Shared fixtures: simulated fleets and a vault seeded on every backend.

use chrono::Utc;
use shared_types::{BackendId, VaultInfo, VaultStatus};
use std::collections::BTreeMap;
use std::sync::Arc;
use vb_01_backend::{simulated_fleet, BackendRegistry, DynBackend, SimulatedBackend, SimulationProfile};

/// Vault id present on every backend built by [`seeded_fleet`].
pub const SHARED_VAULT: &str = "vault-shared-001";

pub fn shared_vault() -> VaultInfo {
    VaultInfo {
        vault_id: SHARED_VAULT.to_string(),
        owner: "0xOwner".to_string(),
        beneficiaries: vec!["0xHeir1".to_string(), "0xHeir2".to_string()],
        balance: 1.5,
        asset_type: "ETH".to_string(),
        status: VaultStatus::Locked,
        unlock_at: Some(Utc::now() + chrono::Duration::days(30)),
        metadata: BTreeMap::from([("label".to_string(), "estate".to_string())]),
    }
}

/// Backends with 1-2 ms latency, so suites stay fast.
pub fn quick(profile: SimulationProfile) -> SimulationProfile {
    profile.with_latency(1, 2)
}

/// Five chain-flavoured backends with quick latency.
pub fn chain_fleet() -> Vec<Arc<SimulatedBackend>> {
    simulated_fleet([
        (BackendId::from("ethereum"), quick(SimulationProfile::ethereum())),
        (BackendId::from("arbitrum"), quick(SimulationProfile::arbitrum())),
        (BackendId::from("solana"), quick(SimulationProfile::solana())),
        (BackendId::from("ton"), quick(SimulationProfile::ton())),
        (BackendId::from("bitcoin"), quick(SimulationProfile::bitcoin())),
    ])
}

/// Fleet built from explicit specs, with [`SHARED_VAULT`] seeded everywhere.
pub fn seeded_fleet(
    specs: impl IntoIterator<Item = (&'static str, SimulationProfile)>,
) -> Vec<Arc<SimulatedBackend>> {
    let fleet = simulated_fleet(
        specs
            .into_iter()
            .map(|(id, profile)| (BackendId::from(id), profile)),
    );
    for backend in &fleet {
        backend.seed_vault(shared_vault());
    }
    fleet
}

pub fn as_dyn(backends: &[Arc<SimulatedBackend>]) -> Vec<DynBackend> {
    backends.iter().map(|b| b.clone() as DynBackend).collect()
}

pub fn registry_of(backends: &[Arc<SimulatedBackend>]) -> Arc<BackendRegistry> {
    let registry = Arc::new(BackendRegistry::new());
    for backend in backends {
        registry.register(backend.clone());
    }
    registry
}
