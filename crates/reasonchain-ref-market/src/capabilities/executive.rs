//! Executive summary: distils whatever upstream steps produced into a short
//! list of priorities.
//!
//! Upstream failures arrive in the dependency context like any other output.
//! They are counted and reported, and lower confidence, but do not fail this
//! step.

use async_trait::async_trait;
use serde_json::json;

use reasonchain_contracts::{
    analysis::{AnalysisReport, AnalysisResult, ContentRecord, DependencyContext},
    capability::{known, CapabilityId},
    error::ReasonchainResult,
};
use reasonchain_core::traits::Capability;

use super::require_content;

pub struct ExecutiveCapability;

/// Payload path whose first entry becomes a priority, per upstream kind.
const PRIORITY_SOURCES: &[(&str, &str, &str)] = &[
    (known::STRATEGIC, "strategic_recommendations.0", "Adopt strategy: {}"),
    (known::COMPETITIVE, "market_gaps.0", "Capture the gap in {}"),
    (known::RISK, "risks.0.name", "Mitigate {} before scaling"),
    (known::MARKET, "predictions.0.trend", "Position for {}"),
];

#[async_trait]
impl Capability for ExecutiveCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::executive()
    }

    async fn analyze(
        &self,
        content: &[ContentRecord],
        topics: &[String],
        context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport> {
        require_content(&self.id(), content)?;

        let reports: Vec<&AnalysisReport> =
            context.values().filter_map(AnalysisResult::as_report).collect();
        let failed = context.len() - reports.len();

        let mut priorities: Vec<String> = PRIORITY_SOURCES
            .iter()
            .filter_map(|(kind, path, template)| {
                reports
                    .iter()
                    .find(|r| r.capability == *kind)
                    .and_then(|r| r.text(path))
                    .map(|finding| template.replace("{}", finding))
            })
            .collect();
        if priorities.is_empty() {
            priorities.push(match topics.first() {
                Some(topic) => format!("Commission a focused review of {}", topic),
                None => "Commission a focused review of the source material".to_string(),
            });
        }

        let confidence = match (reports.len(), failed) {
            (0, _) => 0.4,
            (ok, 0) => (0.6 + 0.05 * ok as f64).min(0.85),
            (ok, _) => (0.5 + 0.05 * ok as f64).min(0.7),
        };

        Ok(AnalysisReport::new(
            self.id(),
            json!({
                "key_recommendations": priorities,
                "upstream": {
                    "received": context.keys().collect::<Vec<_>>(),
                    "failed": failed,
                },
                "executive_summary": format!(
                    "{} upstream analyses informed this summary across {} documents",
                    reports.len(),
                    content.len()
                ),
            }),
        )
        .with_confidence_score(confidence))
    }
}
