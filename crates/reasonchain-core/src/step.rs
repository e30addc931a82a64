//! The step executor: runs exactly one step and never lets a capability
//! failure escape.
//!
//! Per step:
//!
//!   Pending → Running → [Capability::analyze] → Completed | Failed → progress
//!
//! A capability that returns `Err`, panics, or overruns the optional
//! deadline produces a `Failed` step whose output is an `AnalysisFailure`
//! and whose confidence is 0. The only errors this module returns are
//! illegal status transitions.

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, warn};

use reasonchain_contracts::{
    analysis::{AnalysisFailure, AnalysisReport, AnalysisResult},
    chain::{ChainId, ReasoningStep, StepStatus},
    error::ReasonchainResult,
    progress::ProgressEvent,
};

use crate::{
    confidence::{report_confidence, ConfidencePolicy},
    registry::CapabilityRegistry,
    traits::ProgressSink,
};

pub struct StepExecutor {
    registry: Arc<CapabilityRegistry>,
    policy: ConfidencePolicy,
    timeout: Option<Duration>,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl StepExecutor {
    /// A step executor with the default confidence policy, no deadline, and
    /// no progress sink.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            policy: ConfidencePolicy::default(),
            timeout: None,
            progress: None,
        }
    }

    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fail any step whose capability runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    /// Run `step` to a terminal state.
    ///
    /// The step's `input.dependency_context` must already be filled in by
    /// the caller.
    pub async fn execute(&self, chain_id: ChainId, step: &mut ReasoningStep) -> ReasonchainResult<()> {
        step.transition(StepStatus::Running)?;
        step.started_at = Some(Utc::now());
        let started = Instant::now();

        debug!(
            chain_id = %chain_id,
            step_id = %step.step_id,
            capability = %step.capability,
            dependencies = step.input.dependency_context.len(),
            "step starting"
        );

        let outcome = self.invoke(step).await;
        step.duration_ms = Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));

        match outcome {
            Ok(report) => {
                step.confidence = report_confidence(&report, &self.policy);
                step.output = Some(AnalysisResult::Report(report));
                step.transition(StepStatus::Completed)?;
                debug!(
                    chain_id = %chain_id,
                    step_id = %step.step_id,
                    confidence = step.confidence,
                    duration_ms = step.duration_ms,
                    "step completed"
                );
            }
            Err(reason) => {
                warn!(
                    chain_id = %chain_id,
                    step_id = %step.step_id,
                    capability = %step.capability,
                    error = %reason,
                    "step failed"
                );
                record_failure(step, reason);
                step.transition(StepStatus::Failed)?;
            }
        }

        self.notify(chain_id, step);
        Ok(())
    }

    /// Fail a step that was never started (its task was lost, or it was
    /// never reached). Progress is reported like for any other failure.
    pub fn abandon(
        &self,
        chain_id: ChainId,
        step: &mut ReasoningStep,
        reason: impl Into<String>,
    ) -> ReasonchainResult<()> {
        let reason = reason.into();
        warn!(
            chain_id = %chain_id,
            step_id = %step.step_id,
            reason = %reason,
            "step abandoned"
        );
        record_failure(step, reason);
        step.transition(StepStatus::Failed)?;
        step.duration_ms.get_or_insert(0);
        self.notify(chain_id, step);
        Ok(())
    }

    async fn invoke(&self, step: &ReasoningStep) -> Result<AnalysisReport, String> {
        let Some(capability) = self.registry.get(&step.capability) else {
            return Err(format!("capability '{}' is not registered", step.capability));
        };

        let analysis = &step.input.analysis;
        let call = AssertUnwindSafe(capability.analyze(
            &analysis.content,
            &analysis.topics,
            &step.input.dependency_context,
        ))
        .catch_unwind();

        let caught = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(caught) => caught,
                Err(_) => return Err(format!("timed out after {} ms", limit.as_millis())),
            },
            None => call.await,
        };

        match caught {
            Ok(Ok(report)) => Ok(report),
            Ok(Err(e)) => Err(e.to_string()),
            Err(panic) => Err(format!("capability panicked: {}", panic_message(panic.as_ref()))),
        }
    }

    fn notify(&self, chain_id: ChainId, step: &ReasoningStep) {
        let Some(sink) = &self.progress else {
            return;
        };

        let event = ProgressEvent {
            chain_id,
            step_id: step.step_id.clone(),
            capability: step.capability.clone(),
            status: step.status(),
            confidence: step.confidence,
            duration_ms: step.duration_ms.unwrap_or(0),
            timestamp: Utc::now(),
        };

        match std::panic::catch_unwind(AssertUnwindSafe(|| sink.on_step(&event))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(step_id = %step.step_id, error = %e, "progress sink rejected event"),
            Err(_) => warn!(step_id = %step.step_id, "progress sink panicked"),
        }
    }
}

fn record_failure(step: &mut ReasoningStep, error: String) {
    step.confidence = 0.0;
    step.output = Some(AnalysisResult::Failure(AnalysisFailure {
        capability: step.capability.clone(),
        error,
    }));
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
