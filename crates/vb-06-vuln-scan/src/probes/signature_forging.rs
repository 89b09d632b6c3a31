//! Verifies a genuine signature, a tampered signature and a tampered message.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{retry, Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use shared_types::BackendError;

pub struct SignatureForgingProbe;

/// Flip the last character of a signature.
fn tamper(signature: &str) -> String {
    let mut forged: Vec<char> = signature.chars().collect();
    match forged.last_mut() {
        Some(last) => *last = if *last == '0' { '1' } else { '0' },
        None => forged.push('0'),
    }
    forged.into_iter().collect()
}

#[async_trait]
impl Probe for SignatureForgingProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::SignatureForging
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "Signature Forgery Acceptance",
            description: "The backend accepted a signature that does not match the signed message.",
            severity: Severity::Critical,
            detection_method: "Verified tampered signatures and tampered messages",
            exploitation_difficulty: ExploitationDifficulty::Easy,
            potential_impact: "Unauthorized operations authorized with forged signatures",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let Some(address) = backend.address() else {
            return Ok(ProbeFinding::Skipped("Backend has no session signer".to_string()));
        };
        let message = format!("vault-scan:{}:authorize-unlock", target.vault.vault_id);

        let signature = match retry(target.max_attempts, |_| backend.sign_message(&message)).await {
            Ok(signature) => signature,
            Err(err) => return Ok(ProbeFinding::Skipped(format!("Signing failed: {}", err))),
        };

        let forged_signature = tamper(&signature);
        let forged_message = format!("{}:tampered", message);
        let attempts = [
            ("tampered signature", message.as_str(), forged_signature.as_str()),
            ("tampered message", forged_message.as_str(), signature.as_str()),
        ];
        let mut accepted = Vec::new();
        for (label, msg, sig) in attempts {
            if let Ok(true) = backend.verify_signature(msg, sig, &address).await {
                accepted.push(label);
            }
        }
        if !accepted.is_empty() {
            return Ok(ProbeFinding::Vulnerable(format!(
                "Forged input accepted: {}",
                accepted.join(", ")
            )));
        }

        match backend.verify_signature(&message, &signature, &address).await {
            Ok(true) => Ok(ProbeFinding::Secure(
                "Forged signatures rejected, genuine signature verified".to_string(),
            )),
            Ok(false) => Ok(ProbeFinding::Suspicious(
                "Genuine signature was rejected".to_string(),
            )),
            Err(err) => Ok(ProbeFinding::Suspicious(format!(
                "Genuine signature could not be verified: {}",
                err
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::testing::target;
    use vb_01_backend::{FaultMode, SimulatedOp, SimulationProfile};

    #[test]
    fn test_tamper_changes_last_char() {
        assert_eq!(tamper("abc0"), "abc1");
        assert_eq!(tamper("abcf"), "abc0");
        assert_eq!(tamper(""), "0");
    }

    #[tokio::test]
    async fn test_forgery_detected() {
        let (_, target) = target(SimulationProfile::default().vulnerable()).await;
        let finding = SignatureForgingProbe.execute(target).await.unwrap();
        assert!(matches!(finding, ProbeFinding::Vulnerable(_)));
    }

    #[tokio::test]
    async fn test_strict_signatures_pass() {
        let (_, target) = target(SimulationProfile::default()).await;
        let finding = SignatureForgingProbe.execute(target).await.unwrap();
        assert!(matches!(finding, ProbeFinding::Secure(_)));
    }

    #[tokio::test]
    async fn test_signing_failure_skips() {
        let (sim, target) = target(SimulationProfile::default()).await;
        sim.set_fault(SimulatedOp::SignMessage, Some(FaultMode::Fail));
        let finding = SignatureForgingProbe.execute(target).await.unwrap();
        assert!(matches!(finding, ProbeFinding::Skipped(_)));
    }
}
