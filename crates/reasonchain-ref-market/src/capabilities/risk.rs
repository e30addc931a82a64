//! Risk analysis: named risks with severity and an overall level.

use async_trait::async_trait;
use serde_json::json;

use reasonchain_contracts::{
    analysis::{AnalysisReport, ContentRecord, DependencyContext},
    capability::CapabilityId,
    error::ReasonchainResult,
};
use reasonchain_core::traits::Capability;

use crate::mock_data::{evidence_confidence, rank_signals, RISKS};

use super::require_content;

pub struct RiskCapability;

/// Highest severity present, or `low` when nothing was found.
fn overall_level<'a>(severities: impl Iterator<Item = &'a str>) -> &'static str {
    let mut level = "low";
    for severity in severities {
        match severity {
            "high" => return "high",
            "medium" => level = "medium",
            _ => {}
        }
    }
    level
}

#[async_trait]
impl Capability for RiskCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::risk()
    }

    async fn analyze(
        &self,
        content: &[ContentRecord],
        _topics: &[String],
        _context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport> {
        require_content(&self.id(), content)?;

        let found = rank_signals(content, RISKS.iter().map(|(signal, _)| signal));
        let hits: usize = found.iter().map(|(_, h)| h).sum();

        Ok(AnalysisReport::new(
            self.id(),
            json!({
                "risks": found
                    .iter()
                    .map(|(i, mentions)| {
                        let (signal, severity) = &RISKS[*i];
                        json!({ "name": signal.label, "severity": severity, "mentions": mentions })
                    })
                    .collect::<Vec<_>>(),
                "overall_risk_level": overall_level(found.iter().map(|(i, _)| RISKS[*i].1)),
            }),
        )
        .with_confidence_score(evidence_confidence(hits)))
    }
}
