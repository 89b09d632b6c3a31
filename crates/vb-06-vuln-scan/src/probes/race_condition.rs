//! Fires concurrent locks at a fresh vault and checks the final balance
//! against the accepted amounts.

use super::require_accepted;
use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{retry, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use shared_types::{BackendError, VaultCreationParams};

const RACE_VAULT_BALANCE: f64 = 1.0;
const BALANCE_TOLERANCE: f64 = 1e-9;

pub struct RaceConditionProbe;

/// Distinct per submission so replay protection does not collapse them.
fn race_amount(index: usize) -> f64 {
    0.01 * (index + 1) as f64
}

#[async_trait]
impl Probe for RaceConditionProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::RaceConditions
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Race Condition in Balance Accounting",
            description: "Concurrent lock transactions left the vault balance inconsistent with the accepted amounts.",
            severity: Severity::High,
            detection_method: "Submitted concurrent locks and compared the resulting balance",
            exploitation_difficulty: ExploitationDifficulty::Difficult,
            potential_impact: "Lost deposits and corrupted vault balances",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;

        let created = retry(target.max_attempts, |_| {
            let params = VaultCreationParams {
                owner_address: target.vault.owner_address.clone(),
                name: "race-probe".to_string(),
                initial_balance: RACE_VAULT_BALANCE,
                initial_asset_type: target.vault.asset_type.clone(),
                ..Default::default()
            };
            async move {
                let receipt = backend.create_vault(params).await.and_then(require_accepted)?;
                receipt
                    .vault_id
                    .ok_or_else(|| BackendError::Rejected("No vault id returned".to_string()))
            }
        })
        .await;
        let vault_id = match created {
            Ok(id) => id,
            Err(err) => {
                return Ok(ProbeFinding::Skipped(format!(
                    "Race vault creation failed: {}",
                    err
                )))
            }
        };

        let initial = match retry(target.max_attempts, |_| backend.get_vault_info(&vault_id)).await {
            Ok(info) => info.balance,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Balance read failed: {}", err))),
        };

        let asset_type = target.vault.asset_type.clone();
        let locked_id = vault_id.clone();
        let locks = target
            .coordinator
            .run_concurrent(
                backend,
                target.race_width,
                target.call_timeout,
                move |backend, index| {
                    let vault_id = locked_id.clone();
                    let asset_type = asset_type.clone();
                    async move {
                        backend
                            .lock_assets(&vault_id, race_amount(index), &asset_type)
                            .await
                    }
                },
            )
            .await;
        let (accepted, expected_increase) = locks
            .iter()
            .enumerate()
            .filter(|(_, settled)| settled.succeeded())
            .fold((0usize, 0.0f64), |(count, sum), (index, _)| {
                (count + 1, sum + race_amount(index))
            });

        let actual = match retry(target.max_attempts, |_| backend.get_vault_info(&vault_id)).await {
            Ok(info) => info.balance,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Balance read failed: {}", err))),
        };
        let expected = initial + expected_increase;

        if (actual - expected).abs() > BALANCE_TOLERANCE {
            Ok(ProbeFinding::Vulnerable(format!(
                "Balance {:.6} after {} accepted concurrent locks, expected {:.6}",
                actual, accepted, expected
            )))
        } else {
            Ok(ProbeFinding::Secure(format!(
                "Balance consistent after {} of {} concurrent locks",
                accepted, target.race_width
            )))
        }
    }
}
