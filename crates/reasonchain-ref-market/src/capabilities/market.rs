//! Market prediction: directional movements and the resulting outlook.

use async_trait::async_trait;
use serde_json::json;

use reasonchain_contracts::{
    analysis::{AnalysisReport, ContentRecord, DependencyContext},
    capability::CapabilityId,
    error::ReasonchainResult,
};
use reasonchain_core::traits::Capability;

use crate::mock_data::{evidence_confidence, rank_signals, MOVEMENTS};

use super::require_content;

pub struct MarketCapability;

#[async_trait]
impl Capability for MarketCapability {
    fn id(&self) -> CapabilityId {
        CapabilityId::market()
    }

    async fn analyze(
        &self,
        content: &[ContentRecord],
        _topics: &[String],
        _context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport> {
        require_content(&self.id(), content)?;

        let found = rank_signals(content, MOVEMENTS.iter().map(|(signal, _)| signal));
        let (mut up, mut down) = (0usize, 0usize);
        for (i, hits) in &found {
            match MOVEMENTS[*i].1 {
                "up" => up += hits,
                _ => down += hits,
            }
        }
        let outlook = match up.cmp(&down) {
            std::cmp::Ordering::Greater => "positive",
            std::cmp::Ordering::Less => "negative",
            std::cmp::Ordering::Equal => "neutral",
        };

        Ok(AnalysisReport::new(
            self.id(),
            json!({
                "predictions": found
                    .iter()
                    .map(|(i, hits)| {
                        let (signal, direction) = &MOVEMENTS[*i];
                        json!({ "trend": signal.label, "direction": direction, "strength": hits })
                    })
                    .collect::<Vec<_>>(),
                "market_outlook": outlook,
            }),
        )
        .with_confidence_score(evidence_confidence(up + down)))
    }
}
