//! Tries to unlock a vault whose timelock has not expired.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{retry, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use chrono::Utc;
use shared_types::BackendError;

pub struct AccessControlProbe;

#[async_trait]
impl Probe for AccessControlProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::AccessControlBypass
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Timelock Access Control Bypass",
            description: "Assets were unlocked from a vault before its timelock expired.",
            severity: Severity::Critical,
            detection_method: "Requested an unlock on a vault with an active timelock",
            exploitation_difficulty: ExploitationDifficulty::Easy,
            potential_impact: "Premature withdrawal of time-locked assets",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let vault_id = target.vault.vault_id.as_str();

        let info = match retry(target.max_attempts, |_| backend.get_vault_info(vault_id)).await {
            Ok(info) => info,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Vault read failed: {}", err))),
        };
        let unlock_at = match info.unlock_at {
            Some(at) if at > Utc::now() => at,
            _ => {
                return Ok(ProbeFinding::Skipped(
                    "Vault has no active timelock".to_string(),
                ))
            }
        };

        match backend.unlock_assets(vault_id).await {
            Ok(receipt) if receipt.success => Ok(ProbeFinding::Vulnerable(format!(
                "Unlock accepted in transaction {} while timelocked until {}",
                receipt.tx_hash,
                unlock_at.to_rfc3339()
            ))),
            Ok(receipt) => Ok(ProbeFinding::Secure(format!(
                "Unlock rejected: {}",
                receipt.error_message.unwrap_or_default()
            ))),
            Err(err) => Ok(ProbeFinding::Secure(format!("Unlock refused: {}", err))),
        }
    }
}
