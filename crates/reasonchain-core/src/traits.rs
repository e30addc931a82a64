//! The two seams of the orchestrator:
//!
//! - `Capability`: untrusted analysis logic, plugged in through the registry
//! - `ProgressSink`: optional observer notified as each step finishes
//!
//! Neither is allowed to break a run. The step executor converts capability
//! errors and panics into failed steps, and sink errors are logged and
//! dropped.

use async_trait::async_trait;

use reasonchain_contracts::{
    analysis::{AnalysisReport, ContentRecord, DependencyContext},
    capability::CapabilityId,
    error::{ReasonchainError, ReasonchainResult},
    progress::ProgressEvent,
};

/// A pluggable analysis unit.
///
/// Implementations are stateless from the orchestrator's point of view and
/// may be invoked concurrently for different chains; any configuration they
/// close over must be read-only.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The identifier this capability is registered under.
    fn id(&self) -> CapabilityId;

    /// Analyze `content` with the focus given by `topics`.
    ///
    /// `context` maps each declared dependency's `step_id` to that step's
    /// output, which may be a failure. Returning `Err` fails only this step;
    /// the chain keeps going.
    async fn analyze(
        &self,
        content: &[ContentRecord],
        topics: &[String],
        context: &DependencyContext,
    ) -> ReasonchainResult<AnalysisReport>;
}

/// Receives one `ProgressEvent` per step that reaches a terminal state.
///
/// Errors returned here are swallowed by the step executor; progress
/// reporting never affects analysis.
pub trait ProgressSink: Send + Sync {
    fn on_step(&self, event: &ProgressEvent) -> ReasonchainResult<()>;
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) -> Result<(), ReasonchainError> + Send + Sync,
{
    fn on_step(&self, event: &ProgressEvent) -> ReasonchainResult<()> {
        self(event)
    }
}
