//! # Simulated Backend
//!
//! In-memory `VaultBackend` with configurable behavior. Each protection the
//! security probes look for (replay de-duplication, atomic balance updates,
//! sync target validation, strict signatures, unique approvals, timelocks,
//! not-found reads) can be switched off to model a vulnerable chain
//! integration, and every operation can be forced to fail or hang.

use crate::events::{EventCallback, EventHub, Subscription};
use crate::ports::{BackendResult, VaultBackend};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use shared_types::{
    Address, BackendError, BackendEvent, BackendId, CapabilityProfile, ChainFamily, EventKind,
    IntegrityReport, MultiSigOperation, MultiSigState, MultiSigStatus, TransactionReceipt,
    VaultCreationParams, VaultInfo, VaultStatus,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

/// Operations that accept fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulatedOp {
    Connect,
    GetBalance,
    CreateVault,
    GetVaultInfo,
    LockAssets,
    UnlockAssets,
    AddBeneficiary,
    RemoveBeneficiary,
    VerifyIntegrity,
    SignMessage,
    VerifySignature,
    CreateMultisig,
    ApproveMultisig,
    MultisigStatus,
    InitiateSync,
    VerifyAcrossChains,
}

/// Injected fault behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultMode {
    /// Return a network error.
    Fail,
    /// Never complete.
    Hang,
}

/// Behavior knobs of a `SimulatedBackend`.
#[derive(Debug, Clone)]
pub struct SimulationProfile {
    pub display_name: String,
    pub chain_family: ChainFamily,
    pub native_currency: String,
    pub test_mode: bool,
    /// Probability in `[0, 1]` that a state-changing call is accepted.
    pub success_rate: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Fee charged per accepted write, in native currency.
    pub fee_native: f64,
    /// Balance reported for every wallet address.
    pub wallet_balance: f64,
    /// Reject identical lock submissions inside `replay_window_ms`.
    pub replay_protection: bool,
    pub replay_window_ms: u64,
    /// Apply balance updates under one lock instead of read-sleep-write.
    pub atomic_balances: bool,
    /// Only sync to known peer backends.
    pub validate_sync_targets: bool,
    /// Recompute signatures on verification instead of accepting any non-empty one.
    pub strict_signatures: bool,
    /// Answer reads of unknown vault ids with fabricated data.
    pub phantom_reads: bool,
    /// Reject unlocks before the vault's timelock expires.
    pub enforce_timelocks: bool,
    /// Reject a second approval from the same signer.
    pub unique_approvals: bool,
    pub required_approvals: u32,
    pub faults: HashMap<SimulatedOp, FaultMode>,
    pub seed: Option<u64>,
}

impl Default for SimulationProfile {
    fn default() -> Self {
        Self {
            display_name: "Simulated Chain".to_string(),
            chain_family: ChainFamily::Evm,
            native_currency: "ETH".to_string(),
            test_mode: true,
            success_rate: 1.0,
            min_latency_ms: 1,
            max_latency_ms: 5,
            fee_native: 0.001,
            wallet_balance: 10.0,
            replay_protection: true,
            replay_window_ms: 60_000,
            atomic_balances: true,
            validate_sync_targets: true,
            strict_signatures: true,
            phantom_reads: false,
            enforce_timelocks: true,
            unique_approvals: true,
            required_approvals: 2,
            faults: HashMap::new(),
            seed: None,
        }
    }
}

impl SimulationProfile {
    /// Ethereum-like: slow, expensive, EVM.
    pub fn ethereum() -> Self {
        Self {
            display_name: "Ethereum".to_string(),
            native_currency: "ETH".to_string(),
            min_latency_ms: 40,
            max_latency_ms: 90,
            fee_native: 0.0021,
            ..Self::default()
        }
    }

    /// Arbitrum-like: EVM rollup, fast and cheap.
    pub fn arbitrum() -> Self {
        Self {
            display_name: "Arbitrum".to_string(),
            native_currency: "ARB".to_string(),
            min_latency_ms: 10,
            max_latency_ms: 30,
            fee_native: 0.0003,
            ..Self::default()
        }
    }

    /// Solana-like: account model, very fast.
    pub fn solana() -> Self {
        Self {
            display_name: "Solana".to_string(),
            chain_family: ChainFamily::AccountModel,
            native_currency: "SOL".to_string(),
            min_latency_ms: 5,
            max_latency_ms: 20,
            fee_native: 0.000005,
            ..Self::default()
        }
    }

    /// TON-like: account model.
    pub fn ton() -> Self {
        Self {
            display_name: "TON".to_string(),
            chain_family: ChainFamily::AccountModel,
            native_currency: "TON".to_string(),
            min_latency_ms: 10,
            max_latency_ms: 40,
            fee_native: 0.005,
            ..Self::default()
        }
    }

    /// Bitcoin-like: UTXO, slowest.
    pub fn bitcoin() -> Self {
        Self {
            display_name: "Bitcoin".to_string(),
            chain_family: ChainFamily::Utxo,
            native_currency: "BTC".to_string(),
            min_latency_ms: 90,
            max_latency_ms: 160,
            fee_native: 0.00002,
            ..Self::default()
        }
    }

    /// Switch every protection off.
    pub fn vulnerable(mut self) -> Self {
        self.replay_protection = false;
        self.atomic_balances = false;
        self.validate_sync_targets = false;
        self.strict_signatures = false;
        self.phantom_reads = true;
        self.enforce_timelocks = false;
        self.unique_approvals = false;
        self
    }

    pub fn with_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_latency_ms = min_ms;
        self.max_latency_ms = max_ms.max(min_ms);
        self
    }

    pub fn with_success_rate(mut self, rate: f64) -> Self {
        self.success_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_fault(mut self, op: SimulatedOp, mode: FaultMode) -> Self {
        self.faults.insert(op, mode);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Stored vault plus the digest of its last committed state.
struct VaultRecord {
    info: VaultInfo,
    seal: String,
}

impl VaultRecord {
    fn new(info: VaultInfo) -> Self {
        let seal = seal_of(&info);
        Self { info, seal }
    }

    fn commit(&mut self) {
        self.seal = seal_of(&self.info);
    }

    fn is_intact(&self) -> bool {
        self.seal == seal_of(&self.info)
    }
}

fn seal_of(info: &VaultInfo) -> String {
    let mut beneficiaries = info.beneficiaries.clone();
    beneficiaries.sort();
    let mut hasher = Sha256::new();
    hasher.update(info.vault_id.as_bytes());
    hasher.update(info.owner.as_bytes());
    hasher.update(beneficiaries.join(",").as_bytes());
    hasher.update(format!("{:.9}", info.balance).as_bytes());
    hasher.update(info.asset_type.as_bytes());
    hasher.update(format!("{:?}", info.status).as_bytes());
    hex::encode(hasher.finalize())
}

fn new_tx_hash() -> String {
    format!("0x{}", Uuid::new_v4().simple())
}

/// In-memory vault backend.
pub struct SimulatedBackend {
    id: BackendId,
    profile: SimulationProfile,
    session: RwLock<Option<Address>>,
    vaults: RwLock<HashMap<String, VaultRecord>>,
    /// Lock fingerprint -> (submitted at, tx hash).
    recent_locks: Mutex<HashMap<String, (Instant, String)>>,
    requests: Mutex<HashMap<String, MultiSigStatus>>,
    /// Vault id -> peers it was synced to.
    synced: RwLock<HashMap<String, BTreeSet<BackendId>>>,
    known_peers: RwLock<BTreeSet<BackendId>>,
    faults: RwLock<HashMap<SimulatedOp, FaultMode>>,
    rng: Mutex<StdRng>,
    events: EventHub,
}

impl SimulatedBackend {
    pub fn new(id: impl Into<BackendId>, profile: SimulationProfile) -> Self {
        let rng = match profile.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let faults = profile.faults.clone();
        Self {
            id: id.into(),
            profile,
            session: RwLock::new(None),
            vaults: RwLock::new(HashMap::new()),
            recent_locks: Mutex::new(HashMap::new()),
            requests: Mutex::new(HashMap::new()),
            synced: RwLock::new(HashMap::new()),
            known_peers: RwLock::new(BTreeSet::new()),
            faults: RwLock::new(faults),
            rng: Mutex::new(rng),
            events: EventHub::new(),
        }
    }

    /// Behavior profile.
    pub fn profile(&self) -> &SimulationProfile {
        &self.profile
    }

    /// Accept `peer` as a cross-chain sync target.
    pub fn add_peer(&self, peer: BackendId) {
        if peer != self.id {
            self.known_peers.write().insert(peer);
        }
    }

    /// Set or clear the injected fault for `op`.
    pub fn set_fault(&self, op: SimulatedOp, mode: Option<FaultMode>) {
        let mut faults = self.faults.write();
        match mode {
            Some(mode) => faults.insert(op, mode),
            None => faults.remove(&op),
        };
    }

    /// Insert a vault under its own id, committed as intact.
    pub fn seed_vault(&self, info: VaultInfo) {
        self.vaults
            .write()
            .insert(info.vault_id.clone(), VaultRecord::new(info));
    }

    /// Mutate a stored vault without committing the change.
    ///
    /// Returns `false` when the vault does not exist.
    pub fn tamper_vault(&self, vault_id: &str, f: impl FnOnce(&mut VaultInfo)) -> bool {
        match self.vaults.write().get_mut(vault_id) {
            Some(record) => {
                f(&mut record.info);
                true
            }
            None => false,
        }
    }

    pub fn vault_count(&self) -> usize {
        self.vaults.read().len()
    }

    fn sample_latency(&self) -> Duration {
        let (min, max) = (self.profile.min_latency_ms, self.profile.max_latency_ms);
        let ms = if max > min {
            self.rng.lock().gen_range(min..=max)
        } else {
            min
        };
        Duration::from_millis(ms)
    }

    fn roll_success(&self) -> bool {
        self.profile.success_rate >= 1.0 || self.rng.lock().gen::<f64>() < self.profile.success_rate
    }

    /// Apply injected faults, then simulated network latency.
    async fn enter(&self, op: SimulatedOp) -> BackendResult<()> {
        let fault = self.faults.read().get(&op).copied();
        match fault {
            Some(FaultMode::Fail) => {
                debug!(backend = %self.id, ?op, "Injected failure");
                return Err(BackendError::Network(format!("Injected fault in {:?}", op)));
            }
            Some(FaultMode::Hang) => {
                debug!(backend = %self.id, ?op, "Injected hang");
                std::future::pending::<()>().await;
            }
            None => {}
        }
        tokio::time::sleep(self.sample_latency()).await;
        Ok(())
    }

    fn require_session(&self) -> BackendResult<Address> {
        self.session.read().clone().ok_or(BackendError::NotConnected)
    }

    fn require_vault(&self, vault_id: &str) -> BackendResult<()> {
        if self.vaults.read().contains_key(vault_id) {
            Ok(())
        } else {
            Err(BackendError::VaultNotFound(vault_id.to_string()))
        }
    }

    fn derive_address(&self) -> Address {
        let digest = hex::encode(Sha256::digest(self.id.as_str().as_bytes()));
        match self.profile.chain_family {
            ChainFamily::Evm => format!("0x{}", &digest[..40]),
            ChainFamily::AccountModel => digest[..44].to_string(),
            ChainFamily::Utxo => format!("bc1q{}", &digest[..38]),
        }
    }

    fn signature_for(address: &str, message: &str) -> String {
        hex::encode(Sha256::digest(format!("{}:{}", address, message).as_bytes()))
    }

    fn integrity_of(&self, vault_id: &str) -> BackendResult<IntegrityReport> {
        let vaults = self.vaults.read();
        let record = vaults
            .get(vault_id)
            .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
        if !record.is_intact() {
            return Ok(IntegrityReport::compromised(
                "Vault state does not match its committed seal",
            ));
        }
        let mut report = IntegrityReport::intact(vec![record.seal.clone()]);
        report.cross_chain_confirmations = self
            .synced
            .read()
            .get(vault_id)
            .map(|peers| peers.len() as u32)
            .unwrap_or(0);
        Ok(report)
    }

    fn accepted(&self) -> TransactionReceipt {
        TransactionReceipt::accepted(new_tx_hash(), Some(self.profile.fee_native))
    }

    fn reverted(&self) -> TransactionReceipt {
        TransactionReceipt::rejected(new_tx_hash(), "Transaction reverted by network")
    }

    fn emit(&self, kind: EventKind, vault_id: &str, tx_hash: Option<String>) {
        self.events.publish(&BackendEvent {
            kind,
            backend_id: self.id.clone(),
            vault_id: vault_id.to_string(),
            tx_hash,
            timestamp: Utc::now(),
        });
    }

    fn check_replay(&self, vault_id: &str, amount: f64, asset_type: &str, tx: &str) -> Option<String> {
        if !self.profile.replay_protection {
            return None;
        }
        let key = format!("{}:{}:{}", vault_id, amount, asset_type);
        let window = Duration::from_millis(self.profile.replay_window_ms);
        let mut recent = self.recent_locks.lock();
        recent.retain(|_, (at, _)| at.elapsed() < window);
        if let Some((_, prior)) = recent.get(&key) {
            return Some(prior.clone());
        }
        recent.insert(key, (Instant::now(), tx.to_string()));
        None
    }
}

/// Build simulated backends that accept each other as sync peers.
pub fn simulated_fleet(
    specs: impl IntoIterator<Item = (BackendId, SimulationProfile)>,
) -> Vec<Arc<SimulatedBackend>> {
    let fleet: Vec<Arc<SimulatedBackend>> = specs
        .into_iter()
        .map(|(id, profile)| Arc::new(SimulatedBackend::new(id, profile)))
        .collect();
    for backend in &fleet {
        for peer in &fleet {
            backend.add_peer(peer.id.clone());
        }
    }
    fleet
}

#[async_trait]
impl VaultBackend for SimulatedBackend {
    fn id(&self) -> &BackendId {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.profile.display_name
    }

    fn is_test_mode(&self) -> bool {
        self.profile.test_mode
    }

    fn chain_family(&self) -> ChainFamily {
        self.profile.chain_family
    }

    fn native_currency(&self) -> &str {
        &self.profile.native_currency
    }

    async fn connect(&self) -> BackendResult<Address> {
        self.enter(SimulatedOp::Connect).await?;
        let address = self.derive_address();
        *self.session.write() = Some(address.clone());
        debug!(backend = %self.id, %address, "Session opened");
        Ok(address)
    }

    async fn disconnect(&self) -> BackendResult<()> {
        *self.session.write() = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.session.read().is_some()
    }

    fn address(&self) -> Option<Address> {
        self.session.read().clone()
    }

    async fn get_balance(&self, _address: &str) -> BackendResult<f64> {
        self.enter(SimulatedOp::GetBalance).await?;
        Ok(self.profile.wallet_balance)
    }

    async fn create_vault(&self, params: VaultCreationParams) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::CreateVault).await?;
        let session = self.require_session()?;

        if params.initial_balance < 0.0 || !params.initial_balance.is_finite() {
            return Ok(TransactionReceipt::rejected(
                new_tx_hash(),
                "Invalid initial balance",
            ));
        }
        if !self.roll_success() {
            return Ok(self.reverted());
        }

        let vault_id = format!(
            "{}-vault-{}",
            self.id,
            &Uuid::new_v4().simple().to_string()[..12]
        );
        let owner = if params.owner_address.is_empty() {
            session
        } else {
            params.owner_address
        };
        let asset_type = if params.initial_asset_type.is_empty() {
            self.profile.native_currency.clone()
        } else {
            params.initial_asset_type
        };
        let mut metadata: BTreeMap<String, String> = params.metadata;
        if !params.name.is_empty() {
            metadata.insert("name".to_string(), params.name);
        }

        let info = VaultInfo {
            vault_id: vault_id.clone(),
            owner,
            beneficiaries: params.beneficiaries,
            balance: params.initial_balance,
            asset_type,
            status: VaultStatus::Active,
            unlock_at: params
                .timelock_secs
                .map(|secs| Utc::now() + ChronoDuration::seconds(secs as i64)),
            metadata,
        };
        self.seed_vault(info);

        let receipt = self.accepted().with_vault(vault_id.clone());
        self.emit(EventKind::VaultCreated, &vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn get_vault_info(&self, vault_id: &str) -> BackendResult<VaultInfo> {
        self.enter(SimulatedOp::GetVaultInfo).await?;
        if let Some(record) = self.vaults.read().get(vault_id) {
            return Ok(record.info.clone());
        }
        if self.profile.phantom_reads {
            return Ok(VaultInfo {
                vault_id: vault_id.to_string(),
                owner: self.derive_address(),
                beneficiaries: Vec::new(),
                balance: 0.0,
                asset_type: self.profile.native_currency.clone(),
                status: VaultStatus::Active,
                unlock_at: None,
                metadata: BTreeMap::new(),
            });
        }
        Err(BackendError::VaultNotFound(vault_id.to_string()))
    }

    async fn lock_assets(
        &self,
        vault_id: &str,
        amount: f64,
        asset_type: &str,
    ) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::LockAssets).await?;
        self.require_session()?;
        self.require_vault(vault_id)?;

        if amount <= 0.0 || !amount.is_finite() {
            return Ok(TransactionReceipt::rejected(
                new_tx_hash(),
                "Lock amount must be positive",
            ));
        }

        let tx_hash = new_tx_hash();
        if let Some(prior) = self.check_replay(vault_id, amount, asset_type, &tx_hash) {
            return Ok(TransactionReceipt::rejected(
                tx_hash,
                format!("Duplicate transaction: replay of {}", prior),
            ));
        }
        if !self.roll_success() {
            return Ok(self.reverted());
        }

        if self.profile.atomic_balances {
            let mut vaults = self.vaults.write();
            let record = vaults
                .get_mut(vault_id)
                .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
            record.info.balance += amount;
            record.info.status = VaultStatus::Locked;
            record.commit();
        } else {
            let snapshot = self
                .vaults
                .read()
                .get(vault_id)
                .map(|record| record.info.balance)
                .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
            tokio::time::sleep(self.sample_latency()).await;
            let mut vaults = self.vaults.write();
            let record = vaults
                .get_mut(vault_id)
                .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
            record.info.balance = snapshot + amount;
            record.info.status = VaultStatus::Locked;
            record.commit();
        }

        self.emit(EventKind::AssetsLocked, vault_id, Some(tx_hash.clone()));
        Ok(TransactionReceipt::accepted(tx_hash, Some(self.profile.fee_native)))
    }

    async fn unlock_assets(&self, vault_id: &str) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::UnlockAssets).await?;
        self.require_session()?;

        let unlock_at = self
            .vaults
            .read()
            .get(vault_id)
            .map(|record| record.info.unlock_at)
            .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;

        if self.profile.enforce_timelocks {
            if let Some(at) = unlock_at {
                if at > Utc::now() {
                    return Ok(TransactionReceipt::rejected(
                        new_tx_hash(),
                        format!("Vault is timelocked until {}", at.to_rfc3339()),
                    ));
                }
            }
        }
        if !self.roll_success() {
            return Ok(self.reverted());
        }

        if let Some(record) = self.vaults.write().get_mut(vault_id) {
            record.info.status = VaultStatus::Unlocked;
            record.commit();
        }
        let receipt = self.accepted();
        self.emit(EventKind::AssetsUnlocked, vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn add_beneficiary(
        &self,
        vault_id: &str,
        beneficiary: &str,
    ) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::AddBeneficiary).await?;
        self.require_session()?;
        self.require_vault(vault_id)?;

        if beneficiary.trim().is_empty() {
            return Ok(TransactionReceipt::rejected(
                new_tx_hash(),
                "Invalid beneficiary address",
            ));
        }
        if !self.roll_success() {
            return Ok(self.reverted());
        }

        {
            let mut vaults = self.vaults.write();
            let record = vaults
                .get_mut(vault_id)
                .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
            if record.info.beneficiaries.iter().any(|b| b == beneficiary) {
                return Ok(TransactionReceipt::rejected(
                    new_tx_hash(),
                    "Beneficiary already registered",
                ));
            }
            record.info.beneficiaries.push(beneficiary.to_string());
            record.commit();
        }

        let receipt = self.accepted();
        self.emit(EventKind::BeneficiaryChanged, vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn remove_beneficiary(
        &self,
        vault_id: &str,
        beneficiary: &str,
    ) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::RemoveBeneficiary).await?;
        self.require_session()?;
        self.require_vault(vault_id)?;

        if !self.roll_success() {
            return Ok(self.reverted());
        }

        {
            let mut vaults = self.vaults.write();
            let record = vaults
                .get_mut(vault_id)
                .ok_or_else(|| BackendError::VaultNotFound(vault_id.to_string()))?;
            let before = record.info.beneficiaries.len();
            record.info.beneficiaries.retain(|b| b != beneficiary);
            if record.info.beneficiaries.len() == before {
                return Ok(TransactionReceipt::rejected(
                    new_tx_hash(),
                    "Beneficiary not found",
                ));
            }
            record.commit();
        }

        let receipt = self.accepted();
        self.emit(EventKind::BeneficiaryChanged, vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn verify_vault_integrity(&self, vault_id: &str) -> BackendResult<IntegrityReport> {
        self.enter(SimulatedOp::VerifyIntegrity).await?;
        self.integrity_of(vault_id)
    }

    async fn sign_message(&self, message: &str) -> BackendResult<String> {
        self.enter(SimulatedOp::SignMessage).await?;
        let address = self.require_session()?;
        Ok(Self::signature_for(&address, message))
    }

    async fn verify_signature(
        &self,
        message: &str,
        signature: &str,
        address: &str,
    ) -> BackendResult<bool> {
        self.enter(SimulatedOp::VerifySignature).await?;
        if self.profile.strict_signatures {
            Ok(Self::signature_for(address, message) == signature)
        } else {
            Ok(!signature.is_empty())
        }
    }

    async fn create_multisig_request(
        &self,
        vault_id: &str,
        operation: MultiSigOperation,
        _params: Value,
    ) -> BackendResult<String> {
        self.enter(SimulatedOp::CreateMultisig).await?;
        self.require_session()?;
        self.require_vault(vault_id)?;

        let request_id = format!("msig-{}", Uuid::new_v4().simple());
        self.requests.lock().insert(
            request_id.clone(),
            MultiSigStatus {
                request_id: request_id.clone(),
                vault_id: vault_id.to_string(),
                operation,
                state: MultiSigState::Pending,
                approvals: Vec::new(),
                required_approvals: self.profile.required_approvals,
            },
        );
        Ok(request_id)
    }

    async fn approve_multisig_request(
        &self,
        request_id: &str,
    ) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::ApproveMultisig).await?;
        let signer = self.require_session()?;

        if !self.roll_success() {
            return Ok(self.reverted());
        }

        let vault_id = {
            let mut requests = self.requests.lock();
            let status = requests
                .get_mut(request_id)
                .ok_or_else(|| BackendError::RequestNotFound(request_id.to_string()))?;
            if self.profile.unique_approvals && status.approvals.contains(&signer) {
                return Ok(TransactionReceipt::rejected(
                    new_tx_hash(),
                    format!("Signer {} already approved", signer),
                ));
            }
            status.approvals.push(signer);
            let distinct: BTreeSet<&Address> = status.approvals.iter().collect();
            if distinct.len() as u32 >= status.required_approvals {
                status.state = MultiSigState::Approved;
            }
            status.vault_id.clone()
        };

        let receipt = self.accepted();
        self.emit(EventKind::MultiSigApproved, &vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn get_multisig_status(&self, request_id: &str) -> BackendResult<MultiSigStatus> {
        self.enter(SimulatedOp::MultisigStatus).await?;
        self.requests
            .lock()
            .get(request_id)
            .cloned()
            .ok_or_else(|| BackendError::RequestNotFound(request_id.to_string()))
    }

    async fn initiate_vault_sync(
        &self,
        vault_id: &str,
        target: &BackendId,
    ) -> BackendResult<TransactionReceipt> {
        self.enter(SimulatedOp::InitiateSync).await?;
        self.require_session()?;
        self.require_vault(vault_id)?;

        if *target == self.id {
            return Ok(TransactionReceipt::rejected(
                new_tx_hash(),
                "Cannot sync a vault to its own backend",
            ));
        }
        if self.profile.validate_sync_targets && !self.known_peers.read().contains(target) {
            warn!(backend = %self.id, %target, "Rejected sync to unknown target");
            return Ok(TransactionReceipt::rejected(
                new_tx_hash(),
                format!("Unknown sync target {}", target),
            ));
        }
        if !self.roll_success() {
            return Ok(self.reverted());
        }

        self.synced
            .write()
            .entry(vault_id.to_string())
            .or_default()
            .insert(target.clone());
        let receipt = self.accepted();
        self.emit(EventKind::SyncInitiated, vault_id, Some(receipt.tx_hash.clone()));
        Ok(receipt)
    }

    async fn verify_vault_across_chains(
        &self,
        vault_id: &str,
    ) -> BackendResult<HashMap<BackendId, IntegrityReport>> {
        self.enter(SimulatedOp::VerifyAcrossChains).await?;
        let own = self.integrity_of(vault_id)?;

        let mut reports = HashMap::new();
        let peers = self.synced.read().get(vault_id).cloned().unwrap_or_default();
        for peer in peers {
            let mut report = IntegrityReport::intact(own.signatures.clone());
            report.is_intact = own.is_intact;
            report.integrity_score = own.integrity_score;
            report.cross_chain_confirmations = 1;
            reports.insert(peer, report);
        }
        reports.insert(self.id.clone(), own);
        Ok(reports)
    }

    fn capability_profile(&self) -> CapabilityProfile {
        CapabilityProfile::for_family(self.profile.chain_family)
    }

    fn subscribe(&self, kind: EventKind, callback: EventCallback) -> Subscription {
        self.events.subscribe(kind, callback)
    }
}
