//! Submits the same lock twice and checks whether the duplicate is accepted.

use super::require_accepted;
use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{retry, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use shared_types::BackendError;

/// Base lock amount; each setup attempt uses a fresh multiple.
const REPLAY_AMOUNT: f64 = 0.0137;

pub struct ReplayProbe;

#[async_trait]
impl Probe for ReplayProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Replay
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Transaction Replay Vulnerability",
            description: "The backend accepted an identical lock submission twice, issuing a new transaction for the duplicate.",
            severity: Severity::High,
            detection_method: "Submitted the same lock transaction twice in quick succession",
            exploitation_difficulty: ExploitationDifficulty::Moderate,
            potential_impact: "Double-spending and duplicated asset movements",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let vault = &target.vault;

        let original = retry(target.max_attempts, |attempt| {
            let amount = REPLAY_AMOUNT * f64::from(attempt + 1);
            async move {
                let receipt = backend
                    .lock_assets(&vault.vault_id, amount, &vault.asset_type)
                    .await
                    .and_then(require_accepted)?;
                Ok::<_, BackendError>((receipt, amount))
            }
        })
        .await;
        let (first, amount) = match original {
            Ok(accepted) => accepted,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Initial lock failed: {}", err))),
        };

        let replayed = match backend
            .lock_assets(&vault.vault_id, amount, &vault.asset_type)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                return Ok(ProbeFinding::Secure(format!(
                    "Duplicate lock refused: {}",
                    err
                )))
            }
        };

        if !replayed.success {
            return Ok(ProbeFinding::Secure(format!(
                "Duplicate lock rejected: {}",
                replayed.error_message.unwrap_or_default()
            )));
        }
        if replayed.tx_hash == first.tx_hash {
            return Ok(ProbeFinding::Secure(
                "Duplicate lock resolved to the original transaction".to_string(),
            ));
        }
        Ok(ProbeFinding::Vulnerable(format!(
            "Duplicate lock accepted as new transaction {} (original {})",
            replayed.tx_hash, first.tx_hash
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::target;
    use vb_01_backend::SimulationProfile;

    #[tokio::test]
    async fn test_replay_detected_on_vulnerable_backend() {
        let (_, target) = target(SimulationProfile::default().vulnerable()).await;
        let finding = ReplayProbe.execute(target).await.unwrap();
        assert!(matches!(finding, ProbeFinding::Vulnerable(_)));
    }

    #[tokio::test]
    async fn test_replay_rejected_on_protected_backend() {
        let (_, target) = target(SimulationProfile::default()).await;
        let finding = ReplayProbe.execute(target).await.unwrap();
        assert!(matches!(finding, ProbeFinding::Secure(ref d) if d.contains("Duplicate")));
    }
}
