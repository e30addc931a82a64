//! The synthesis engine.
//!
//! Pattern selection looks only at the set of capabilities that produced a
//! non-error result. Checks run in this order and the first match wins:
//!
//! 1. four or more distinct capabilities → `full_spectrum`
//! 2. competitive + market               → `competitive_market`
//! 3. risk + market                      → `risk_prediction`
//! 4. strategic + competitive            → `strategic_competitive`
//! 5. anything else                      → `basic`
//!
//! Synthesis confidence is the run-level confidence over that same result
//! set, so it never disagrees with the pattern that fired.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use reasonchain_contracts::{
    analysis::{AnalysisReport, AnalysisResult},
    capability::{known, CapabilityId},
    orchestration::{SynthesisPattern, SynthesisResult},
};
use reasonchain_core::confidence::{report_confidence, run_confidence, ConfidencePolicy};

use crate::findings::Findings;

/// Upper bounds on the insight list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisLimits {
    pub max_general_insights: usize,
    /// Only used by `full_spectrum`.
    pub max_topic_insights: usize,
}

impl Default for SynthesisLimits {
    fn default() -> Self {
        Self {
            max_general_insights: 3,
            max_topic_insights: 3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SynthesisEngine {
    limits: SynthesisLimits,
    policy: ConfidencePolicy,
}

impl SynthesisEngine {
    pub fn new(limits: SynthesisLimits, policy: ConfidencePolicy) -> Self {
        Self { limits, policy }
    }

    pub fn limits(&self) -> &SynthesisLimits {
        &self.limits
    }

    /// Pick the pattern for the capabilities in `present`.
    pub fn select_pattern(present: &BTreeSet<CapabilityId>) -> SynthesisPattern {
        let has = |name: &str| present.iter().any(|id| id == name);

        if present.len() >= 4 {
            SynthesisPattern::FullSpectrum
        } else if has(known::COMPETITIVE) && has(known::MARKET) {
            SynthesisPattern::CompetitiveMarket
        } else if has(known::RISK) && has(known::MARKET) {
            SynthesisPattern::RiskPrediction
        } else if has(known::STRATEGIC) && has(known::COMPETITIVE) {
            SynthesisPattern::StrategicCompetitive
        } else {
            SynthesisPattern::Basic
        }
    }

    /// Combine `results` into a bounded set of cross-capability insights.
    pub fn synthesize(
        &self,
        results: &BTreeMap<CapabilityId, AnalysisResult>,
        topics: &[String],
    ) -> SynthesisResult {
        let reports: BTreeMap<&str, &AnalysisReport> = results
            .iter()
            .filter_map(|(id, result)| result.as_report().map(|report| (id.as_str(), report)))
            .collect();
        let present: BTreeSet<CapabilityId> =
            reports.keys().map(|id| CapabilityId::new(*id)).collect();

        let pattern = Self::select_pattern(&present);
        let findings = Findings::new(&reports);
        let limit = self.limits.max_general_insights;

        let mut insights: Vec<String> = match pattern {
            SynthesisPattern::FullSpectrum => vec![
                format!(
                    "Strategic trend '{}' shapes the competitive position against {}",
                    findings.top_trend(),
                    findings.top_competitor()
                ),
                format!(
                    "Risk '{}' (overall level: {}) should be weighed against a {} market outlook",
                    findings.top_risk(),
                    findings.risk_level(),
                    findings.market_outlook()
                ),
                format!("Executive priority: {}", findings.executive_priority()),
            ],
            SynthesisPattern::CompetitiveMarket => vec![
                format!(
                    "{} is exposed to the predicted shift '{}'",
                    findings.top_competitor(),
                    findings.top_prediction()
                ),
                format!(
                    "Market gap '{}' sits within a {} outlook",
                    findings.market_gap(),
                    findings.market_outlook()
                ),
            ],
            SynthesisPattern::RiskPrediction => vec![
                format!(
                    "Predicted shift '{}' increases exposure to risk '{}'",
                    findings.top_prediction(),
                    findings.top_risk()
                ),
                format!(
                    "Overall risk level {} against a {} market outlook",
                    findings.risk_level(),
                    findings.market_outlook()
                ),
            ],
            SynthesisPattern::StrategicCompetitive => vec![
                format!(
                    "Trend '{}' opens ground against {}",
                    findings.top_trend(),
                    findings.top_competitor()
                ),
                format!(
                    "Strategic move '{}' can target market gap '{}'",
                    findings.strategic_move(),
                    findings.market_gap()
                ),
            ],
            SynthesisPattern::Basic => self.basic_insights(&reports),
        };
        insights.truncate(limit);

        if pattern == SynthesisPattern::FullSpectrum {
            insights.extend(topics.iter().take(self.limits.max_topic_insights).map(|topic| {
                format!(
                    "{}: trend '{}' meets predicted shift '{}' at {} risk",
                    topic,
                    findings.top_trend(),
                    findings.top_prediction(),
                    findings.risk_level()
                )
            }));
        }

        let confidence = run_confidence(results.values(), &self.policy);

        debug!(
            pattern = %pattern,
            capabilities = present.len(),
            insights = insights.len(),
            confidence,
            "synthesis complete"
        );

        SynthesisResult {
            pattern,
            insights,
            confidence,
            capabilities: present.into_iter().collect(),
        }
    }

    fn basic_insights(&self, reports: &BTreeMap<&str, &AnalysisReport>) -> Vec<String> {
        if reports.is_empty() {
            return vec![
                "No capability produced a usable result; generic guidance applies".to_string(),
            ];
        }
        reports
            .iter()
            .map(|(id, report)| {
                format!(
                    "{} analysis completed with confidence {:.2}",
                    id,
                    report_confidence(report, &self.policy)
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use reasonchain_contracts::analysis::AnalysisFailure;

    use super::*;

    fn report(id: &str, score: f64, payload: serde_json::Value) -> (CapabilityId, AnalysisResult) {
        (
            CapabilityId::new(id),
            AnalysisResult::Report(
                AnalysisReport::new(CapabilityId::new(id), payload).with_confidence_score(score),
            ),
        )
    }

    fn failure(id: &str) -> (CapabilityId, AnalysisResult) {
        (
            CapabilityId::new(id),
            AnalysisResult::Failure(AnalysisFailure {
                capability: CapabilityId::new(id),
                error: "boom".to_string(),
            }),
        )
    }

    fn set(ids: &[&str]) -> BTreeSet<CapabilityId> {
        ids.iter().map(|id| CapabilityId::new(*id)).collect()
    }

    fn full_payloads() -> BTreeMap<CapabilityId, AnalysisResult> {
        BTreeMap::from([
            report("strategic", 0.8, json!({ "key_trends": ["subscription pricing"] })),
            report("competitive", 0.7, json!({ "competitors": [{ "name": "Globex" }] })),
            report(
                "risk",
                0.6,
                json!({ "risks": [{ "name": "regulatory scrutiny" }], "overall_risk_level": "medium" }),
            ),
            report(
                "market",
                0.9,
                json!({ "predictions": [{ "trend": "consolidation" }], "market_outlook": "positive" }),
            ),
            report("executive", 0.85, json!({ "key_recommendations": ["expand the EU pilot"] })),
        ])
    }

    #[test]
    fn pattern_order_is_first_match_wins() {
        assert_eq!(
            SynthesisEngine::select_pattern(&set(&["strategic", "competitive"])),
            SynthesisPattern::StrategicCompetitive
        );
        assert_eq!(
            SynthesisEngine::select_pattern(&set(&["competitive", "market", "strategic"])),
            SynthesisPattern::CompetitiveMarket
        );
        assert_eq!(
            SynthesisEngine::select_pattern(&set(&["risk", "market"])),
            SynthesisPattern::RiskPrediction
        );
        assert_eq!(
            SynthesisEngine::select_pattern(&set(&["competitive", "risk", "market"])),
            SynthesisPattern::CompetitiveMarket
        );
        assert_eq!(
            SynthesisEngine::select_pattern(&set(&["strategic", "risk", "market", "executive"])),
            SynthesisPattern::FullSpectrum
        );
        assert_eq!(SynthesisEngine::select_pattern(&set(&["risk"])), SynthesisPattern::Basic);
        assert_eq!(SynthesisEngine::select_pattern(&set(&[])), SynthesisPattern::Basic);
    }

    #[test]
    fn pattern_ignores_insertion_order() {
        let forward = set(&["strategic", "competitive", "risk", "market", "executive"]);
        let backward = set(&["executive", "market", "risk", "competitive", "strategic"]);
        assert_eq!(SynthesisEngine::select_pattern(&forward), SynthesisPattern::FullSpectrum);
        assert_eq!(SynthesisEngine::select_pattern(&backward), SynthesisPattern::FullSpectrum);
    }

    #[test]
    fn full_spectrum_pairs_fields_across_capabilities() {
        let engine = SynthesisEngine::default();
        let topics = vec!["pricing".to_string(), "europe".to_string()];
        let result = engine.synthesize(&full_payloads(), &topics);

        assert_eq!(result.pattern, SynthesisPattern::FullSpectrum);
        assert_eq!(result.insights.len(), 5);
        assert!(result.insights[0].contains("subscription pricing"));
        assert!(result.insights[0].contains("Globex"));
        assert!(result.insights[1].contains("regulatory scrutiny"));
        assert!(result.insights[2].contains("expand the EU pilot"));
        assert!(result.insights[3].starts_with("pricing:"));
        assert!(result.insights[4].contains("consolidation"));
    }

    #[test]
    fn topic_insights_are_capped() {
        let engine = SynthesisEngine::default();
        let topics: Vec<String> = (0..10).map(|i| format!("topic-{}", i)).collect();
        let result = engine.synthesize(&full_payloads(), &topics);
        assert_eq!(result.insights.len(), 6);
    }

    #[test]
    fn missing_fields_degrade_to_placeholders() {
        let engine = SynthesisEngine::default();
        let results = BTreeMap::from([
            report("strategic", 0.8, json!({})),
            report("competitive", 0.8, json!({ "competitors": "not a list" })),
        ]);
        let result = engine.synthesize(&results, &[]);

        assert_eq!(result.pattern, SynthesisPattern::StrategicCompetitive);
        assert!(result.insights[0].contains("an emerging trend"));
        assert!(result.insights[0].contains("the leading competitor"));
    }

    #[test]
    fn failures_do_not_count_as_present() {
        let engine = SynthesisEngine::default();
        let results = BTreeMap::from([
            report("competitive", 0.8, json!({})),
            failure("market"),
            failure("risk"),
        ]);
        let result = engine.synthesize(&results, &[]);

        assert_eq!(result.pattern, SynthesisPattern::Basic);
        assert_eq!(result.capabilities, vec![CapabilityId::competitive()]);
        assert!((result.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn all_failed_is_basic_at_floor() {
        let engine = SynthesisEngine::default();
        let results: BTreeMap<_, _> = ["strategic", "competitive", "risk", "market", "executive"]
            .into_iter()
            .map(failure)
            .collect();
        let result = engine.synthesize(&results, &["x".to_string()]);

        assert_eq!(result.pattern, SynthesisPattern::Basic);
        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.insights.len(), 1);
        assert!(result.insights[0].contains("generic guidance"));
    }

    #[test]
    fn basic_lists_each_capability_within_limit() {
        let engine = SynthesisEngine::new(
            SynthesisLimits { max_general_insights: 1, max_topic_insights: 0 },
            ConfidencePolicy::default(),
        );
        let results = BTreeMap::from([
            report("executive", 0.9, json!({})),
            report("risk", 0.4, json!({})),
        ]);
        let result = engine.synthesize(&results, &[]);
        assert_eq!(result.insights, vec!["executive analysis completed with confidence 0.90"]);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let engine = SynthesisEngine::default();
        let topics = vec!["pricing".to_string()];
        assert_eq!(
            engine.synthesize(&full_payloads(), &topics),
            engine.synthesize(&full_payloads(), &topics)
        );
    }
}
