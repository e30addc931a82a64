//! Reasoning chains, steps, and their lifecycle.
//!
//! A `ReasoningChain` is owned by exactly one orchestration call. Steps move
//! through `Pending → Running → Completed | Failed`; terminal states are
//! final and `ReasoningStep::transition` refuses to leave them.

use std::{fmt, str::FromStr, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::{AnalysisInput, AnalysisResult, DependencyContext},
    capability::CapabilityId,
    error::{ReasonchainError, ReasonchainResult},
};

/// Unique identifier for one chain instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub uuid::Uuid);

impl ChainId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution strategy for a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    Sequential,
    Parallel,
    Hierarchical,
    Iterative,
    /// Runs exactly like `Sequential`. Adversarial behavior, if any, belongs
    /// to the capabilities.
    Debate,
}

impl Topology {
    pub const ALL: [Topology; 5] = [
        Topology::Sequential,
        Topology::Parallel,
        Topology::Hierarchical,
        Topology::Iterative,
        Topology::Debate,
    ];

    /// True for topologies whose batches may fan out concurrently.
    pub fn is_concurrent(self) -> bool {
        matches!(self, Topology::Parallel | Topology::Hierarchical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Topology::Sequential => "sequential",
            Topology::Parallel => "parallel",
            Topology::Hierarchical => "hierarchical",
            Topology::Iterative => "iterative",
            Topology::Debate => "debate",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = ReasonchainError;

    fn from_str(s: &str) -> ReasonchainResult<Self> {
        Topology::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReasonchainError::Design {
                reason: format!("unknown topology '{}'", s),
            })
    }
}

/// How much analysis to run when the caller does not name capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    Rapid,
    Standard,
    Deep,
    Ultra,
}

impl AnalysisDepth {
    pub const ALL: [AnalysisDepth; 4] = [
        AnalysisDepth::Rapid,
        AnalysisDepth::Standard,
        AnalysisDepth::Deep,
        AnalysisDepth::Ultra,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisDepth::Rapid => "rapid",
            AnalysisDepth::Standard => "standard",
            AnalysisDepth::Deep => "deep",
            AnalysisDepth::Ultra => "ultra",
        }
    }
}

impl fmt::Display for AnalysisDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisDepth {
    type Err = ReasonchainError;

    fn from_str(s: &str) -> ReasonchainResult<Self> {
        AnalysisDepth::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReasonchainError::Design {
                reason: format!("unknown analysis depth '{}'", s),
            })
    }
}

/// What a step hands to its capability.
///
/// `analysis` is shared by every step of the chain; `dependency_context` is
/// filled in by the chain executor right before the step runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepInput {
    #[serde(skip)]
    pub analysis: Arc<AnalysisInput>,
    #[serde(default)]
    pub dependency_context: DependencyContext,
}

/// One scheduled invocation of a capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// Unique within the owning chain.
    pub step_id: String,
    pub capability: CapabilityId,
    pub input: StepInput,
    /// Step ids whose outputs must be terminal before this step may run.
    pub dependencies: Vec<String>,
    pub output: Option<AnalysisResult>,
    status: StepStatus,
    /// Normalized [0,1] confidence derived from `output`.
    pub confidence: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

impl ReasoningStep {
    /// Confidence a step carries before anything is known about its output.
    pub const DEFAULT_CONFIDENCE: f64 = 0.5;

    pub fn new(
        step_id: impl Into<String>,
        capability: CapabilityId,
        analysis: Arc<AnalysisInput>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            capability,
            input: StepInput {
                analysis,
                dependency_context: DependencyContext::new(),
            },
            dependencies,
            output: None,
            status: StepStatus::Pending,
            confidence: Self::DEFAULT_CONFIDENCE,
            started_at: None,
            duration_ms: None,
        }
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Move the step to `next`.
    ///
    /// Legal moves: `Pending → Running`, `Pending → Failed` (a step that could
    /// never be started), and `Running → Completed | Failed`.
    pub fn transition(&mut self, next: StepStatus) -> ReasonchainResult<()> {
        let legal = matches!(
            (self.status, next),
            (StepStatus::Pending, StepStatus::Running)
                | (StepStatus::Pending, StepStatus::Failed)
                | (StepStatus::Running, StepStatus::Completed)
                | (StepStatus::Running, StepStatus::Failed)
        );
        if !legal {
            return Err(ReasonchainError::StateMachine {
                reason: format!(
                    "step '{}' cannot move from {} to {}",
                    self.step_id, self.status, next
                ),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// A named graph of steps plus the strategy used to run it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningChain {
    pub chain_id: ChainId,
    pub name: String,
    pub topology: Topology,
    pub depth: AnalysisDepth,
    pub steps: Vec<ReasoningStep>,
    /// Execution batches in order, as step ids. Computed once at design time;
    /// every step of batch n depends only on steps of earlier batches.
    pub batches: Vec<Vec<String>>,
    /// Set once every step is terminal.
    pub overall_confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ReasoningChain {
    pub fn step(&self, step_id: &str) -> Option<&ReasoningStep> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.step_id == step_id)
    }

    /// True when no step is pending or running.
    pub fn is_settled(&self) -> bool {
        self.steps.iter().all(|s| s.status().is_terminal())
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status() == StepStatus::Completed)
            .count()
    }
}
