//! Recommendation assembly.
//!
//! The list is ordered by category, not by score:
//! top insight, coordination note, high-confidence capabilities, closing note.

use std::collections::BTreeMap;

use reasonchain_contracts::{
    analysis::AnalysisResult, capability::CapabilityId, orchestration::SynthesisResult,
};
use reasonchain_core::confidence::{report_confidence, ConfidencePolicy};

/// Strictly-greater thresholds for the optional entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationThresholds {
    pub high_confidence: f64,
    pub closing_confidence: f64,
    pub coordination_min_capabilities: usize,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            closing_confidence: 0.7,
            coordination_min_capabilities: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationSynthesizer {
    thresholds: RecommendationThresholds,
    policy: ConfidencePolicy,
}

impl RecommendationSynthesizer {
    pub fn new(policy: ConfidencePolicy) -> Self {
        Self {
            thresholds: RecommendationThresholds::default(),
            policy,
        }
    }

    pub fn with_thresholds(mut self, thresholds: RecommendationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn recommend(
        &self,
        synthesis: &SynthesisResult,
        results: &BTreeMap<CapabilityId, AnalysisResult>,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if let Some(top) = synthesis.insights.first() {
            recommendations.push(top.clone());
        }

        if results.len() >= self.thresholds.coordination_min_capabilities {
            recommendations.push(format!(
                "Coordinate actions across the {} capabilities that contributed to this analysis",
                results.len()
            ));
        }

        let confident: Vec<&str> = results
            .iter()
            .filter_map(|(id, result)| {
                result
                    .as_report()
                    .filter(|r| report_confidence(r, &self.policy) > self.thresholds.high_confidence)
                    .map(|_| id.as_str())
            })
            .collect();
        if !confident.is_empty() {
            recommendations.push(format!("High-confidence findings from: {}", confident.join(", ")));
        }

        if synthesis.confidence > self.thresholds.closing_confidence {
            recommendations.push(
                "Overall confidence supports acting on these findings now".to_string(),
            );
        }

        recommendations
    }
}

/// Recommendations used when the orchestration itself could not complete.
pub fn generic_recommendations() -> Vec<String> {
    vec![
        "Analysis could not be completed; treat these results as provisional".to_string(),
        "Re-run the analysis with fresh content before making decisions".to_string(),
    ]
}
