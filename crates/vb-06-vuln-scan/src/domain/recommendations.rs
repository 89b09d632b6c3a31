//! Remediation advice and overall verdict derived from scan findings.

use super::findings::{
    ImplementationComplexity, Priority, Recommendation, ScanStatus, Severity, TestResult,
    TestStatus, Vulnerability,
};

/// Fewer findings than this add the standing recommendations.
const STANDING_THRESHOLD: usize = 3;

/// One recommendation per vulnerability, plus standing advice when few
/// vulnerabilities were found.
pub fn build_recommendations(vulnerabilities: &[Vulnerability]) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = vulnerabilities
        .iter()
        .map(|vulnerability| {
            let name = vulnerability.name.to_lowercase();
            let (title, description, priority, complexity) = match vulnerability.severity {
                Severity::Critical | Severity::High => (
                    format!("Fix {}", vulnerability.name),
                    format!(
                        "Implement proper protection against {} to prevent {}",
                        name,
                        vulnerability.potential_impact.to_lowercase()
                    ),
                    Priority::Immediate,
                    ImplementationComplexity::Moderate,
                ),
                Severity::Medium => (
                    format!("Address {}", vulnerability.name),
                    format!(
                        "Enhance protection against {} to mitigate potential security risks.",
                        name
                    ),
                    Priority::High,
                    ImplementationComplexity::Moderate,
                ),
                Severity::Low | Severity::Info => (
                    format!("Consider improving {} protection", vulnerability.name),
                    format!(
                        "While not critical, enhancing protection against {} would improve overall security posture.",
                        name
                    ),
                    Priority::Medium,
                    ImplementationComplexity::Simple,
                ),
            };
            Recommendation {
                id: format!("REC-{}", vulnerability.id),
                title,
                description,
                priority,
                implementation_complexity: complexity,
                related_vulnerability_ids: vec![vulnerability.id.clone()],
            }
        })
        .collect();

    if vulnerabilities.len() < STANDING_THRESHOLD {
        recommendations.push(Recommendation {
            id: "REC-GENERAL-1".to_string(),
            title: "Implement Regular Security Audits".to_string(),
            description: "Schedule regular third-party security audits to continuously identify and address new vulnerabilities.".to_string(),
            priority: Priority::Medium,
            implementation_complexity: ImplementationComplexity::Moderate,
            related_vulnerability_ids: Vec::new(),
        });
        recommendations.push(Recommendation {
            id: "REC-GENERAL-2".to_string(),
            title: "Enhance Security Monitoring".to_string(),
            description: "Implement advanced security monitoring to detect and respond to potential attacks in real-time.".to_string(),
            priority: Priority::Medium,
            implementation_complexity: ImplementationComplexity::Complex,
            related_vulnerability_ids: Vec::new(),
        });
    }
    recommendations
}

/// Failed if any test failed, else warning if any warned, else passed.
pub fn overall_status(results: &[TestResult]) -> ScanStatus {
    if results.iter().any(|r| r.status == TestStatus::Failed) {
        ScanStatus::Failed
    } else if results.iter().any(|r| r.status == TestStatus::Warning) {
        ScanStatus::Warning
    } else {
        ScanStatus::Passed
    }
}
