//! The orchestrator facade.
//!
//! One call walks a fixed state machine:
//!
//! ```text
//! Designing ──► Executing ──► Synthesizing ──► Done
//!     │              │               │
//!     ▼              └───────┬───────┘
//!  Err(Design)               ▼
//!                    Done (fallback result)
//! ```
//!
//! Design errors reach the caller and nothing runs. Once a chain exists, the
//! caller always gets an `OrchestrationResult`: an execution or synthesis
//! error, or a panic in either phase, is turned into the fallback result
//! (confidence 0.3, `basic` pattern, generic recommendations, `degraded`).

use std::{
    collections::{btree_map::Entry, BTreeMap, BTreeSet},
    fmt,
    panic::AssertUnwindSafe,
    sync::Arc,
};

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, warn};

use reasonchain_config::OrchestratorConfig;
use reasonchain_contracts::{
    analysis::{AnalysisInput, AnalysisResult},
    capability::CapabilityId,
    chain::ReasoningChain,
    error::{ReasonchainError, ReasonchainResult},
    orchestration::{OrchestrationId, OrchestrationResult, SynthesisPattern, SynthesisResult},
};
use reasonchain_core::{
    designer::{ChainDesigner, DesignRequest},
    registry::FALLBACK_CONFIDENCE,
    traits::ProgressSink,
    CapabilityRegistry, ChainExecutor, StepExecutor,
};
use reasonchain_synthesis::{generic_recommendations, RecommendationSynthesizer, SynthesisEngine};

use crate::request::OrchestrationRequest;

/// Where an orchestration call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestrationPhase {
    Designing,
    Executing,
    Synthesizing,
    Done,
}

impl OrchestrationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            OrchestrationPhase::Designing => "designing",
            OrchestrationPhase::Executing => "executing",
            OrchestrationPhase::Synthesizing => "synthesizing",
            OrchestrationPhase::Done => "done",
        }
    }
}

impl fmt::Display for OrchestrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(id: OrchestrationId, phase: OrchestrationPhase) {
    debug!(orchestration_id = %id, phase = %phase, "orchestration phase");
}

pub struct Orchestrator {
    registry: Arc<CapabilityRegistry>,
    config: OrchestratorConfig,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl Orchestrator {
    /// An orchestrator with the built-in configuration and no progress sink.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            config: OrchestratorConfig::default(),
            progress: None,
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// A designer over this orchestrator's registry and templates, for
    /// callers that want to build or assemble chains themselves.
    pub fn designer(&self) -> ChainDesigner {
        ChainDesigner::new(Arc::clone(&self.registry)).with_templates(self.config.templates.clone())
    }

    /// Design a chain for `request`, run it, and synthesize the results.
    ///
    /// # Errors
    ///
    /// Only `Design`: unknown capability, bad level assignment, and the
    /// like. Every later failure yields a degraded result instead.
    pub async fn orchestrate(
        &self,
        request: OrchestrationRequest,
    ) -> ReasonchainResult<OrchestrationResult> {
        let id = OrchestrationId::new();
        enter(id, OrchestrationPhase::Designing);

        let mut design = DesignRequest::new(request.depth, Arc::new(request.analysis_input()));
        if let Some(capabilities) = request.capabilities {
            design = design.with_capabilities(capabilities);
        }
        if let Some(topology) = request.topology {
            design = design.with_topology(topology);
        }
        if let Some(levels) = request.levels {
            design = design.with_levels(levels);
        }

        let chain = self.designer().design(&design).map_err(|e| {
            warn!(orchestration_id = %id, error = %e, "chain design rejected");
            e
        })?;

        Ok(self.run(id, chain).await)
    }

    /// Run an already designed or assembled chain to a result.
    pub async fn run_chain(&self, chain: ReasoningChain) -> OrchestrationResult {
        self.run(OrchestrationId::new(), chain).await
    }

    async fn run(&self, id: OrchestrationId, mut chain: ReasoningChain) -> OrchestrationResult {
        info!(
            orchestration_id = %id,
            depth = %chain.depth,
            topology = %chain.topology,
            steps = chain.steps.len(),
            "orchestration started"
        );
        let input = chain
            .steps
            .first()
            .map(|s| Arc::clone(&s.input.analysis))
            .unwrap_or_default();

        enter(id, OrchestrationPhase::Executing);
        let executor = ChainExecutor::new(Arc::new(self.step_executor()));
        let executed = AssertUnwindSafe(executor.execute(&mut chain))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(ReasonchainError::Orchestration {
                    reason: "chain execution panicked".to_string(),
                })
            });
        if let Err(e) = executed {
            return self.fallback(id, &chain, &input, e);
        }

        enter(id, OrchestrationPhase::Synthesizing);
        let results = collect_results(&chain);
        let synthesized = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let engine = SynthesisEngine::new(self.config.synthesis, self.config.confidence);
            let synthesis = engine.synthesize(&results, &input.topics);
            let recommendations =
                RecommendationSynthesizer::new(self.config.confidence).recommend(&synthesis, &results);
            (synthesis, recommendations)
        }));
        let (synthesis, recommendations) = match synthesized {
            Ok(done) => done,
            Err(_) => {
                let e = ReasonchainError::Orchestration {
                    reason: "synthesis panicked".to_string(),
                };
                return self.fallback(id, &chain, &input, e);
            }
        };

        enter(id, OrchestrationPhase::Done);
        info!(
            orchestration_id = %id,
            pattern = %synthesis.pattern,
            capabilities = results.len(),
            confidence = synthesis.confidence,
            "orchestration complete"
        );

        OrchestrationResult {
            orchestration_id: id,
            depth: chain.depth,
            topology: chain.topology,
            results,
            confidence: synthesis.confidence,
            synthesis,
            recommendations,
            chains: vec![chain],
            degraded: false,
            timestamp: Utc::now(),
        }
    }

    fn step_executor(&self) -> StepExecutor {
        let executor = StepExecutor::new(Arc::clone(&self.registry))
            .with_policy(self.config.confidence)
            .with_timeout(self.config.step_timeout);
        match &self.progress {
            Some(sink) => executor.with_progress(Arc::clone(sink)),
            None => executor,
        }
    }

    fn fallback(
        &self,
        id: OrchestrationId,
        chain: &ReasoningChain,
        input: &AnalysisInput,
        error: ReasonchainError,
    ) -> OrchestrationResult {
        warn!(
            orchestration_id = %id,
            chain_id = %chain.chain_id,
            error = %error,
            "orchestration failed; returning fallback result"
        );
        enter(id, OrchestrationPhase::Done);
        fallback_result(id, chain, input, &self.registry)
    }
}

/// Step outputs keyed by capability. Failed steps are included.
///
/// When a capability runs in several steps, the latest report wins and a
/// failure only stands if no step of that capability produced a report.
fn collect_results(chain: &ReasoningChain) -> BTreeMap<CapabilityId, AnalysisResult> {
    let mut results = BTreeMap::new();
    for step in &chain.steps {
        let Some(output) = &step.output else {
            continue;
        };
        match results.entry(step.capability.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(output.clone());
            }
            Entry::Occupied(mut slot) => {
                if !output.is_failure() || slot.get().is_failure() {
                    slot.insert(output.clone());
                }
            }
        }
    }
    results
}

/// The degraded result: one fallback report per planned capability.
///
/// The chain is left out because its steps may not have settled.
pub(crate) fn fallback_result(
    id: OrchestrationId,
    chain: &ReasoningChain,
    input: &AnalysisInput,
    registry: &CapabilityRegistry,
) -> OrchestrationResult {
    let planned: BTreeSet<CapabilityId> = chain.steps.iter().map(|s| s.capability.clone()).collect();
    let results: BTreeMap<CapabilityId, AnalysisResult> = planned
        .into_iter()
        .map(|cap| {
            let report = registry.fallback(&cap, input);
            (cap, AnalysisResult::Report(report))
        })
        .collect();

    OrchestrationResult {
        orchestration_id: id,
        depth: chain.depth,
        topology: chain.topology,
        results,
        chains: Vec::new(),
        synthesis: SynthesisResult {
            pattern: SynthesisPattern::Basic,
            insights: vec![
                "Analysis could not be completed; generic guidance applies".to_string(),
            ],
            confidence: FALLBACK_CONFIDENCE,
            capabilities: Vec::new(),
        },
        recommendations: generic_recommendations(),
        confidence: FALLBACK_CONFIDENCE,
        degraded: true,
        timestamp: Utc::now(),
    }
}
