//! Error taxonomy for the reasoning chain orchestrator.
//!
//! Each variant has a fixed propagation policy:
//! - `Capability` and `ProgressSink` are recovered where they occur and never
//!   reach the caller.
//! - `Design` and `Config` are surfaced before any step runs.
//! - `Orchestration` and `StateMachine` are turned into the fallback result
//!   at the facade.

use thiserror::Error;

/// The unified error type for the orchestrator crates.
#[derive(Debug, Error)]
pub enum ReasonchainError {
    /// A capability's `analyze` call failed.
    #[error("capability '{capability}' failed: {reason}")]
    Capability { capability: String, reason: String },

    /// The requested chain cannot be built (unknown identifier, dangling
    /// dependency, cycle, missing level assignment).
    #[error("chain design error: {reason}")]
    Design { reason: String },

    /// Something unexpected went wrong while executing or synthesizing.
    #[error("orchestration failure: {reason}")]
    Orchestration { reason: String },

    /// A step was asked to make an illegal status transition.
    #[error("state machine error: {reason}")]
    StateMachine { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A progress sink rejected an event.
    #[error("progress sink error: {reason}")]
    ProgressSink { reason: String },
}

impl ReasonchainError {
    /// Shorthand used by capability implementations.
    pub fn capability(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        ReasonchainError::Capability {
            capability: capability.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the orchestrator crates.
pub type ReasonchainResult<T> = Result<T, ReasonchainError>;
