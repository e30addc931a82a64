//! Competitive analysis: who is mentioned most, and where nobody competes.

use async_trait::async_trait;
use serde_json::json;

use reasonchain_contracts::{
    analysis::{AnalysisReport, ContentRecord, DependencyContext},
    capability::CapabilityId,
    error::ReasonchainResult,
};
use reasonchain_core::traits::Capability;

use crate::mock_data::{count_terms, evidence_confidence, rank_signals, COMPETITORS, MARKET_GAPS};

use super::require_content;

pub struct CompetitiveCapability;

#[async_trait]
impl Capability for CompetitiveCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::competitive()
    }

    async fn analyze(
        &self,
        content: &[ContentRecord],
        _topics: &[String],
        _context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport> {
        require_content(&self.id(), content)?;

        let mut competitors: Vec<(&str, usize)> = COMPETITORS
            .iter()
            .map(|name| (*name, count_terms(content, &[*name])))
            .filter(|(_, mentions)| *mentions > 0)
            .collect();
        competitors.sort_by(|a, b| b.1.cmp(&a.1));

        let gaps = rank_signals(content, MARKET_GAPS);
        let mentions: usize = competitors.iter().map(|(_, m)| m).sum();

        Ok(AnalysisReport::new(
            self.id(),
            json!({
                "competitors": competitors
                    .iter()
                    .map(|(name, mentions)| json!({ "name": name, "mentions": mentions }))
                    .collect::<Vec<_>>(),
                "market_gaps": gaps.iter().map(|(i, _)| MARKET_GAPS[*i].label).collect::<Vec<_>>(),
            }),
        )
        .with_confidence_score(evidence_confidence(mentions)))
    }
}
