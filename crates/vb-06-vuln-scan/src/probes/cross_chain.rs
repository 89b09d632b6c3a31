//! Syncs a vault to a backend id nobody registered, then checks the peers
//! the backend reports for the vault.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use shared_types::{BackendError, BackendId};
use uuid::Uuid;

pub struct CrossChainProbe;

#[async_trait]
impl Probe for CrossChainProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::CrossChain
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Unvalidated Cross-Chain Sync Target",
            description: "The backend started a vault sync to a chain it has no relationship with.",
            severity: Severity::High,
            detection_method: "Initiated a vault sync to an unregistered backend id",
            exploitation_difficulty: ExploitationDifficulty::Moderate,
            potential_impact: "Vault state mirrored to attacker-controlled chains",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let vault_id = target.vault.vault_id.as_str();
        let rogue = BackendId::from(format!(
            "rogue-chain-{}",
            &Uuid::new_v4().simple().to_string()[..8]
        ));

        match backend.initiate_vault_sync(vault_id, &rogue).await {
            Ok(receipt) if receipt.success => {
                return Ok(ProbeFinding::Vulnerable(format!(
                    "Sync to unregistered target {} accepted in transaction {}",
                    rogue, receipt.tx_hash
                )))
            }
            Ok(_) | Err(_) => {}
        }

        let reports = match backend.verify_vault_across_chains(vault_id).await {
            Ok(reports) => reports,
            Err(err) => {
                return Ok(ProbeFinding::Secure(format!(
                    "Unregistered sync target rejected; cross-chain view unavailable: {}",
                    err
                )))
            }
        };
        let mut broken: Vec<String> = reports
            .iter()
            .filter(|(_, report)| !report.is_intact)
            .map(|(id, _)| id.to_string())
            .collect();
        if broken.is_empty() {
            Ok(ProbeFinding::Secure(format!(
                "Unregistered sync target rejected; {} chain views intact",
                reports.len()
            )))
        } else {
            broken.sort();
            Ok(ProbeFinding::Suspicious(format!(
                "Vault not intact on: {}",
                broken.join(", ")
            )))
        }
    }
}
