//! # reasonchain-ref-market
//!
//! Market-intelligence reference capabilities for the reasoning chain
//! orchestrator.
//!
//! Provides five capabilities over mock content:
//!
//! 1. **strategic**: dominant trends and strategic moves
//! 2. **competitive**: competitor mentions and unserved market gaps
//! 3. **risk**: named risks with severity and an overall level
//! 4. **market**: directional predictions and the market outlook
//! 5. **executive**: priorities distilled from upstream outputs
//!
//! plus the per-kind fallback builder the registry injects. All data is
//! hardcoded and fictional. No external API calls are made.

pub mod capabilities;
pub mod fallback;
pub mod mock_data;

use std::sync::Arc;

use reasonchain_core::CapabilityRegistry;

use capabilities::{
    CompetitiveCapability, ExecutiveCapability, MarketCapability, RiskCapability,
    StrategicCapability,
};

/// A registry holding all five capabilities and the market fallback builder.
pub fn default_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(Arc::new(StrategicCapability))
        .with(Arc::new(CompetitiveCapability))
        .with(Arc::new(RiskCapability))
        .with(Arc::new(MarketCapability))
        .with(Arc::new(ExecutiveCapability))
        .with_fallback(Arc::new(fallback::market_fallback))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{collections::BTreeMap, sync::Arc};

    use reasonchain_contracts::{
        analysis::{AnalysisFailure, AnalysisInput, AnalysisReport, AnalysisResult, DependencyContext},
        capability::CapabilityId,
        chain::AnalysisDepth,
        error::ReasonchainError,
        orchestration::SynthesisPattern,
    };
    use reasonchain_core::traits::Capability;
    use reasonchain_runtime::{OrchestrationRequest, Orchestrator};

    use crate::{
        capabilities::{
            CompetitiveCapability, ExecutiveCapability, MarketCapability, RiskCapability,
            StrategicCapability,
        },
        default_registry, fallback::market_fallback,
        mock_data::sample_content,
    };

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn run(capability: &dyn Capability, context: &DependencyContext) -> AnalysisReport {
        capability
            .analyze(&sample_content(), &["pricing".to_string()], context)
            .await
            .unwrap()
    }

    // ── Capabilities ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn strategic_finds_trends_in_the_corpus() {
        let report = run(&StrategicCapability, &DependencyContext::new()).await;
        assert!(report.text("key_trends.0").is_some());
        assert!(report.text("strategic_recommendations.0").is_some());
        assert!(report.lookup("topic_coverage.pricing").is_some());
        assert!(report.confidence_score.unwrap() > 0.5);
    }

    #[tokio::test]
    async fn competitive_ranks_globex_first() {
        let report = run(&CompetitiveCapability, &DependencyContext::new()).await;
        assert_eq!(report.text("competitors.0.name"), Some("Globex"));
        assert!(report.text("market_gaps.0").is_some());
    }

    #[tokio::test]
    async fn risk_reports_high_level_for_regulatory_inquiry() {
        let report = run(&RiskCapability, &DependencyContext::new()).await;
        assert_eq!(report.text("risks.0.name"), Some("regulatory scrutiny"));
        assert_eq!(report.text("overall_risk_level"), Some("high"));
    }

    #[tokio::test]
    async fn market_outlook_is_positive() {
        let report = run(&MarketCapability, &DependencyContext::new()).await;
        assert_eq!(report.text("market_outlook"), Some("positive"));
        assert!(report.text("predictions.0.trend").is_some());
    }

    #[tokio::test]
    async fn empty_content_is_a_capability_error() {
        let outcome = RiskCapability
            .analyze(&[], &[], &DependencyContext::new())
            .await;
        assert!(matches!(outcome, Err(ReasonchainError::Capability { .. })));
    }

    #[tokio::test]
    async fn executive_uses_upstream_findings_and_counts_failures() {
        let strategic = run(&StrategicCapability, &DependencyContext::new()).await;
        let context = BTreeMap::from([
            ("01-strategic".to_string(), AnalysisResult::Report(strategic)),
            (
                "02-risk".to_string(),
                AnalysisResult::Failure(AnalysisFailure {
                    capability: CapabilityId::risk(),
                    error: "timed out".to_string(),
                }),
            ),
        ]);

        let report = run(&ExecutiveCapability, &context).await;
        assert!(report.text("key_recommendations.0").unwrap().starts_with("Adopt strategy"));
        assert_eq!(report.lookup("upstream.failed").and_then(|v| v.as_u64()), Some(1));
        assert!(report.confidence_score.unwrap() <= 0.7);
    }

    #[tokio::test]
    async fn executive_without_context_falls_back_to_topic_review() {
        let report = run(&ExecutiveCapability, &DependencyContext::new()).await;
        assert_eq!(
            report.text("key_recommendations.0"),
            Some("Commission a focused review of pricing")
        );
        assert_eq!(report.confidence_score, Some(0.4));
    }

    // ── Fallbacks ─────────────────────────────────────────────────────────────

    #[test]
    fn fallback_keeps_the_capability_shape() {
        let input = AnalysisInput::new(vec![], vec!["pricing".to_string()]);
        let report = market_fallback(&CapabilityId::risk(), &input);
        assert_eq!(report.text("overall_risk_level"), Some("unassessed"));
        assert_eq!(report.lookup("fallback"), Some(&serde_json::json!(true)));
        assert_eq!(report.confidence_score, Some(0.3));
    }

    #[test]
    fn unknown_kind_gets_generic_fallback() {
        let report = market_fallback(&CapabilityId::new("sentiment"), &AnalysisInput::default());
        assert_eq!(report.confidence_score, Some(0.3));
        assert_eq!(report.lookup("fallback"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn default_registry_holds_all_five() {
        let registry = default_registry();
        assert_eq!(registry.len(), 5);
        assert!(registry.contains(&CapabilityId::market()));
    }

    // ── End to end ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn ultra_run_over_mock_corpus_is_full_spectrum() {
        let orchestrator = Orchestrator::new(Arc::new(default_registry()));
        let result = orchestrator
            .orchestrate(OrchestrationRequest::new(
                AnalysisDepth::Ultra,
                sample_content(),
                vec!["pricing".to_string(), "consolidation".to_string()],
            ))
            .await
            .unwrap();

        assert_eq!(result.synthesis.pattern, SynthesisPattern::FullSpectrum);
        assert_eq!(result.synthesis.insights.len(), 5);
        assert!(result.synthesis.insights[0].contains("Globex"));
        assert!(result.synthesis.insights[1].contains("regulatory scrutiny"));
        assert!(result.chains[0].is_settled());
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn empty_corpus_fails_every_step_but_returns() {
        let orchestrator = Orchestrator::new(Arc::new(default_registry()));
        let result = orchestrator
            .orchestrate(OrchestrationRequest::new(AnalysisDepth::Deep, vec![], vec![]))
            .await
            .unwrap();

        assert_eq!(result.confidence, 0.3);
        assert_eq!(result.synthesis.pattern, SynthesisPattern::Basic);
        assert!(result.results.values().all(AnalysisResult::is_failure));
    }
}
