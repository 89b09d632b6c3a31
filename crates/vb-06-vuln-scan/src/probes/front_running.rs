//! Approves one multi-sig request twice concurrently from the same signer.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{retry, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use serde_json::json;
use shared_types::{BackendError, MultiSigOperation};

pub struct FrontRunningProbe;

#[async_trait]
impl Probe for FrontRunningProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::FrontRunning
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Duplicate Approval Front-Running",
            description: "A single signer could approve the same multi-sig request more than once by racing approvals.",
            severity: Severity::Medium,
            detection_method: "Submitted two concurrent approvals for one request from the same signer",
            exploitation_difficulty: ExploitationDifficulty::Moderate,
            potential_impact: "Multi-signature thresholds reached by a single party",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let Some(signer) = backend.address() else {
            return Ok(ProbeFinding::Skipped("Backend has no session signer".to_string()));
        };

        let request = retry(target.max_attempts, |_| {
            backend.create_multisig_request(
                &target.vault.vault_id,
                MultiSigOperation::AddBeneficiary,
                json!({ "beneficiary": "0x00000000000000000000000000000000000000fe" }),
            )
        })
        .await;
        let request_id = match request {
            Ok(id) => id,
            Err(err) => {
                return Ok(ProbeFinding::Skipped(format!(
                    "Multi-sig request creation failed: {}",
                    err
                )))
            }
        };

        let approved_id = request_id.clone();
        let approvals = target
            .coordinator
            .run_concurrent(backend, 2, target.call_timeout, move |backend, _| {
                let request_id = approved_id.clone();
                async move { backend.approve_multisig_request(&request_id).await }
            })
            .await;
        let accepted = approvals.success_count();

        let status = retry(target.max_attempts, |_| {
            backend.get_multisig_status(&request_id)
        })
        .await;
        let status = match status {
            Ok(status) => status,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Status read failed: {}", err))),
        };

        let own = status.approvals.iter().filter(|a| **a == signer).count();
        if own > 1 {
            Ok(ProbeFinding::Vulnerable(format!(
                "Signer {} recorded {} approvals on request {}",
                signer, own, status.request_id
            )))
        } else {
            Ok(ProbeFinding::Secure(format!(
                "{} of 2 concurrent approvals accepted, {} recorded for the signer",
                accepted, own
            )))
        }
    }
}
