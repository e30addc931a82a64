//! Strategic analysis: dominant trends, moves worth making, topic coverage.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use reasonchain_contracts::{
    analysis::{AnalysisReport, ContentRecord, DependencyContext},
    capability::CapabilityId,
    error::ReasonchainResult,
};
use reasonchain_core::traits::Capability;

use crate::mock_data::{count_terms, evidence_confidence, rank_signals, STRATEGIC_MOVES, TRENDS};

use super::require_content;

pub struct StrategicCapability;

#[async_trait]
impl Capability for StrategicCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::strategic()
    }

    async fn analyze(
        &self,
        content: &[ContentRecord],
        topics: &[String],
        _context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport> {
        require_content(&self.id(), content)?;

        let trends = rank_signals(content, TRENDS);
        let moves = rank_signals(content, STRATEGIC_MOVES);
        let hits: usize = trends.iter().map(|(_, h)| h).sum();

        let coverage: Map<String, Value> = topics
            .iter()
            .map(|t| (t.clone(), json!(count_terms(content, &[t.as_str()]))))
            .collect();

        Ok(AnalysisReport::new(
            self.id(),
            json!({
                "key_trends": trends.iter().map(|(i, _)| TRENDS[*i].label).collect::<Vec<_>>(),
                "strategic_recommendations":
                    moves.iter().map(|(i, _)| STRATEGIC_MOVES[*i].label).collect::<Vec<_>>(),
                "topic_coverage": coverage,
                "documents_analyzed": content.len(),
            }),
        )
        .with_confidence_score(evidence_confidence(hits)))
    }
}
