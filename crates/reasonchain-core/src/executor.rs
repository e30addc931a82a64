//! The chain executor: drives a whole `ReasoningChain` batch by batch.
//!
//! Batches come from the designer and are walked in order. Before a step
//! runs, its dependency context is filled in from outputs that are already
//! terminal:
//!
//! - `iterative`: every step that has already run, whatever it declared
//! - all others: exactly the declared dependencies, failed ones included
//!
//! `parallel` and `hierarchical` batches fan out on a `JoinSet`, one task per
//! step; each task owns a clone of its step and hands it back when done, so
//! no two tasks ever write the same slot. Every other topology runs one step
//! at a time. The executor never inspects capability output.

use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use reasonchain_contracts::{
    analysis::DependencyContext,
    chain::{ReasoningChain, StepStatus, Topology},
    error::{ReasonchainError, ReasonchainResult},
};

use crate::{confidence::chain_confidence, step::StepExecutor};

pub struct ChainExecutor {
    steps: Arc<StepExecutor>,
}

impl ChainExecutor {
    pub fn new(steps: Arc<StepExecutor>) -> Self {
        Self { steps }
    }

    /// Run every step of `chain` to a terminal state, then set its
    /// `overall_confidence` and `completed_at`.
    ///
    /// # Errors
    ///
    /// `Orchestration` if a batch names a step that does not exist or a step
    /// comes up before its dependencies settled; `StateMachine` if a step is
    /// not pending when its turn comes. Capability failures are not errors.
    pub async fn execute(&self, chain: &mut ReasoningChain) -> ReasonchainResult<()> {
        info!(
            chain_id = %chain.chain_id,
            name = %chain.name,
            topology = %chain.topology,
            steps = chain.steps.len(),
            "executing chain"
        );

        let batches = chain.batches.clone();
        for batch in &batches {
            let indices = batch
                .iter()
                .map(|id| {
                    chain.position(id).ok_or_else(|| ReasonchainError::Orchestration {
                        reason: format!("batch references unknown step '{}'", id),
                    })
                })
                .collect::<ReasonchainResult<Vec<usize>>>()?;

            for &i in &indices {
                prepare_context(chain, i)?;
            }

            if chain.topology.is_concurrent() && indices.len() > 1 {
                self.run_concurrent(chain, &indices).await?;
            } else {
                for i in indices {
                    self.steps.execute(chain.chain_id, &mut chain.steps[i]).await?;
                }
            }
        }

        for step in chain.steps.iter_mut() {
            if step.status() == StepStatus::Pending {
                self.steps.abandon(chain.chain_id, step, "step was never scheduled")?;
            }
        }

        let confidence = chain_confidence(chain.topology, &chain.steps, self.steps.policy());
        chain.overall_confidence = Some(confidence);
        chain.completed_at = Some(Utc::now());

        info!(
            chain_id = %chain.chain_id,
            completed = chain.completed_count(),
            total = chain.steps.len(),
            confidence,
            "chain settled"
        );
        Ok(())
    }

    async fn run_concurrent(&self, chain: &mut ReasoningChain, indices: &[usize]) -> ReasonchainResult<()> {
        debug!(
            chain_id = %chain.chain_id,
            width = indices.len(),
            "fanning out batch"
        );

        let mut join_set = JoinSet::new();
        for &i in indices {
            let mut step = chain.steps[i].clone();
            let executor = Arc::clone(&self.steps);
            let chain_id = chain.chain_id;
            join_set.spawn(async move {
                let outcome = executor.execute(chain_id, &mut step).await;
                (i, step, outcome)
            });
        }

        let mut returned = HashSet::with_capacity(indices.len());
        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((i, step, outcome)) => {
                    chain.steps[i] = step;
                    returned.insert(i);
                    if let Err(e) = outcome {
                        first_error.get_or_insert(e);
                    }
                }
                Err(e) => warn!(chain_id = %chain.chain_id, error = %e, "step task did not finish"),
            }
        }

        // Whole batch is terminal before the next one may start.
        for &i in indices {
            if !returned.contains(&i) {
                self.steps
                    .abandon(chain.chain_id, &mut chain.steps[i], "step task aborted before completion")?;
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn prepare_context(chain: &mut ReasoningChain, i: usize) -> ReasonchainResult<()> {
    let step = &chain.steps[i];
    let mut context = DependencyContext::new();

    for dep in &step.dependencies {
        let upstream = chain.step(dep).ok_or_else(|| ReasonchainError::Orchestration {
            reason: format!("step '{}' depends on unknown step '{}'", step.step_id, dep),
        })?;
        if !upstream.status().is_terminal() {
            return Err(ReasonchainError::Orchestration {
                reason: format!(
                    "step '{}' scheduled before dependency '{}' settled",
                    step.step_id, dep
                ),
            });
        }
        if let Some(output) = &upstream.output {
            context.insert(upstream.step_id.clone(), output.clone());
        }
    }

    if chain.topology == Topology::Iterative {
        for earlier in chain.steps.iter().filter(|s| s.status().is_terminal()) {
            if let Some(output) = &earlier.output {
                context.insert(earlier.step_id.clone(), output.clone());
            }
        }
    }

    chain.steps[i].input.dependency_context = context;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::Mutex,
        time::Duration,
    };

    use async_trait::async_trait;
    use serde_json::json;

    use reasonchain_contracts::{
        analysis::{AnalysisInput, AnalysisReport, AnalysisResult, ContentRecord},
        capability::CapabilityId,
        chain::{AnalysisDepth, ReasoningStep},
    };

    use crate::{
        designer::{ChainDesigner, DesignRequest},
        registry::CapabilityRegistry,
        traits::Capability,
    };

    use super::*;

    /// Records which dependency step ids each invocation saw.
    type Seen = Arc<Mutex<BTreeMap<String, Vec<String>>>>;

    struct Probe {
        id: &'static str,
        score: f64,
        fail: bool,
        delay: Duration,
        seen: Seen,
    }

    #[async_trait]
    impl Capability for Probe {
        fn id(&self) -> CapabilityId {
            CapabilityId::new(self.id)
        }

        async fn analyze(
            &self,
            _content: &[ContentRecord],
            _topics: &[String],
            context: &DependencyContext,
        ) -> ReasonchainResult<AnalysisReport> {
            self.seen
                .lock()
                .unwrap()
                .insert(self.id.to_string(), context.keys().cloned().collect());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(ReasonchainError::capability(self.id, "scripted failure"));
            }
            Ok(AnalysisReport::new(self.id(), json!({ "by": self.id })).with_confidence_score(self.score))
        }
    }

    struct Harness {
        designer: ChainDesigner,
        executor: ChainExecutor,
        seen: Seen,
    }

    fn harness(specs: &[(&'static str, bool, u64)]) -> Harness {
        let seen: Seen = Arc::new(Mutex::new(BTreeMap::new()));
        let mut registry = CapabilityRegistry::new();
        for &(id, fail, delay_ms) in specs {
            registry.register(Arc::new(Probe {
                id,
                score: 0.8,
                fail,
                delay: Duration::from_millis(delay_ms),
                seen: Arc::clone(&seen),
            }));
        }
        let registry = Arc::new(registry);
        Harness {
            designer: ChainDesigner::new(Arc::clone(&registry)),
            executor: ChainExecutor::new(Arc::new(StepExecutor::new(registry))),
            seen,
        }
    }

    fn input() -> Arc<AnalysisInput> {
        Arc::new(AnalysisInput::new(vec![], vec!["x".to_string()]))
    }

    fn step(id: &str, capability: &'static str, deps: &[&str]) -> ReasoningStep {
        ReasoningStep::new(
            id,
            CapabilityId::new(capability),
            input(),
            deps.iter().map(|d| d.to_string()).collect(),
        )
    }

    fn design(h: &Harness, topology: Topology, caps: &[&str]) -> ReasoningChain {
        h.designer
            .design(
                &DesignRequest::new(AnalysisDepth::Standard, input())
                    .with_topology(topology)
                    .with_capabilities(caps.iter().map(|c| CapabilityId::new(*c)).collect()),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn every_step_is_terminal_after_execute() {
        for topology in [Topology::Sequential, Topology::Parallel, Topology::Iterative, Topology::Debate] {
            let h = harness(&[("a", false, 0), ("b", true, 0), ("c", false, 0)]);
            let mut chain = design(&h, topology, &["a", "b", "c"]);
            h.executor.execute(&mut chain).await.unwrap();

            assert!(chain.is_settled(), "{} left a step unsettled", topology);
            assert!(chain.overall_confidence.is_some());
            assert!(chain.completed_at.is_some());
        }
    }

    #[tokio::test]
    async fn hierarchical_child_sees_whole_parent_level_even_when_one_failed() {
        let h = harness(&[("a", true, 0), ("b", false, 5), ("c", false, 0)]);
        let steps = vec![step("A", "a", &[]), step("B", "b", &[]), step("C", "c", &["A", "B"])];
        let mut chain = h
            .designer
            .assemble("diamond", Topology::Hierarchical, AnalysisDepth::Deep, steps)
            .unwrap();

        h.executor.execute(&mut chain).await.unwrap();

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen["c"], vec!["A", "B"]);

        let c = chain.step("C").unwrap();
        assert_eq!(c.status(), StepStatus::Completed);
        assert!(c.input.dependency_context["A"].is_failure());
        assert!(!c.input.dependency_context["B"].is_failure());
    }

    #[tokio::test]
    async fn failure_does_not_stop_siblings_or_dependents() {
        let h = harness(&[("a", false, 0), ("b", true, 0), ("c", false, 0)]);
        let mut chain = design(&h, Topology::Sequential, &["a", "b", "c"]);
        h.executor.execute(&mut chain).await.unwrap();

        let statuses: Vec<StepStatus> = chain.steps.iter().map(|s| s.status()).collect();
        assert_eq!(statuses, vec![StepStatus::Completed, StepStatus::Failed, StepStatus::Completed]);
        assert_eq!(chain.steps[1].confidence, 0.0);

        // c declared only b, and receives b's failure payload as context.
        let c_context = &chain.steps[2].input.dependency_context;
        assert_eq!(c_context.len(), 1);
        assert!(matches!(c_context.values().next(), Some(AnalysisResult::Failure(_))));
    }

    #[tokio::test]
    async fn sequential_passes_only_the_predecessor() {
        let h = harness(&[("a", false, 0), ("b", false, 0), ("c", false, 0)]);
        let mut chain = design(&h, Topology::Sequential, &["a", "b", "c"]);
        h.executor.execute(&mut chain).await.unwrap();

        let seen = h.seen.lock().unwrap();
        assert!(seen["a"].is_empty());
        assert_eq!(seen["b"], vec!["01-a"]);
        assert_eq!(seen["c"], vec!["02-b"]);
    }

    #[tokio::test]
    async fn iterative_passes_every_prior_step() {
        let h = harness(&[("a", false, 0), ("b", false, 0), ("c", false, 0)]);
        let mut chain = design(&h, Topology::Iterative, &["a", "b", "c"]);
        h.executor.execute(&mut chain).await.unwrap();

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen["c"], vec!["01-a", "02-b"]);
    }

    #[tokio::test]
    async fn debate_behaves_like_sequential() {
        let h = harness(&[("a", false, 0), ("b", false, 0)]);
        let mut chain = design(&h, Topology::Debate, &["a", "b"]);
        h.executor.execute(&mut chain).await.unwrap();

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen["b"], vec!["01-a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn parallel_wall_clock_tracks_slowest_step() {
        let h = harness(&[("fast", false, 100), ("medium", false, 500), ("slow", false, 2000)]);
        let mut chain = design(&h, Topology::Parallel, &["fast", "medium", "slow"]);

        let started = tokio::time::Instant::now();
        h.executor.execute(&mut chain).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(2000));
        assert!(elapsed < Duration::from_millis(2600), "took {:?}", elapsed);
        assert_eq!(chain.completed_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn sequential_wall_clock_is_the_sum() {
        let h = harness(&[("fast", false, 100), ("medium", false, 500), ("slow", false, 2000)]);
        let mut chain = design(&h, Topology::Sequential, &["fast", "medium", "slow"]);

        let started = tokio::time::Instant::now();
        h.executor.execute(&mut chain).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(2600));
    }

    #[tokio::test]
    async fn empty_chain_settles_at_floor() {
        let h = harness(&[]);
        let mut chain = h
            .designer
            .assemble("empty", Topology::Parallel, AnalysisDepth::Rapid, vec![])
            .unwrap();
        h.executor.execute(&mut chain).await.unwrap();
        assert_eq!(chain.overall_confidence, Some(0.3));
    }

    #[tokio::test]
    async fn unscheduled_step_is_swept_to_failed() {
        let h = harness(&[("a", false, 0), ("b", false, 0)]);
        let mut chain = design(&h, Topology::Parallel, &["a", "b"]);
        chain.batches = vec![vec!["01-a".to_string()]];

        h.executor.execute(&mut chain).await.unwrap();

        assert_eq!(chain.steps[0].status(), StepStatus::Completed);
        assert_eq!(chain.steps[1].status(), StepStatus::Failed);
        assert!(chain.is_settled());
    }

    #[tokio::test]
    async fn out_of_order_batches_are_an_orchestration_failure() {
        let h = harness(&[("a", false, 0), ("b", false, 0)]);
        let mut chain = design(&h, Topology::Sequential, &["a", "b"]);
        chain.batches.reverse();

        let result = h.executor.execute(&mut chain).await;
        assert!(matches!(result, Err(ReasonchainError::Orchestration { .. })));
    }

    #[tokio::test]
    async fn chain_confidence_matches_single_step_scenario() {
        let h = harness(&[("a", false, 0)]);
        let mut chain = design(&h, Topology::Sequential, &["a"]);
        h.executor.execute(&mut chain).await.unwrap();
        // 0.8 + one bonus
        let confidence = chain.overall_confidence.unwrap();
        assert!((confidence - 0.85).abs() < 1e-9);
    }
}
