//! Reads vault ids that cannot exist and checks whether data comes back.

use crate::domain::{ExploitationDifficulty, ProbeKind, Severity};
use crate::ports::{Probe, ProbeFinding, ProbeTarget, VulnerabilityTemplate};
use async_trait::async_trait;
use shared_types::BackendError;
use uuid::Uuid;

pub struct RpcManipulationProbe;

#[async_trait]
impl Probe for RpcManipulationProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::RpcManipulation
    }

    fn vulnerability(&self) -> VulnerabilityTemplate {
        VulnerabilityTemplate {
            name: "RPC Response Manipulation",
            description: "The backend returned vault data for ids that do not exist.",
            severity: Severity::Medium,
            detection_method: "Queried unknown and malformed vault ids",
            exploitation_difficulty: ExploitationDifficulty::Moderate,
            potential_impact: "Clients acting on fabricated vault state",
        }
    }

    async fn execute(&self, target: ProbeTarget) -> Result<ProbeFinding, BackendError> {
        let backend = &target.backend;
        let unknown = format!("nonexistent-{}", Uuid::new_v4().simple());
        let malformed = "../../vault'; --".to_string();

        let mut fabricated = Vec::new();
        for vault_id in [unknown, malformed] {
            if let Ok(info) = backend.get_vault_info(&vault_id).await {
                fabricated.push(format!("{} (owner {})", vault_id, info.owner));
            }
        }

        if fabricated.is_empty() {
            Ok(ProbeFinding::Secure(
                "Unknown and malformed vault ids were rejected".to_string(),
            ))
        } else {
            Ok(ProbeFinding::Vulnerable(format!(
                "Data returned for: {}",
                fabricated.join(", ")
            )))
        }
    }
}
