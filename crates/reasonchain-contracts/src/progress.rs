//! Progress events emitted as steps finish.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    capability::CapabilityId,
    chain::{ChainId, StepStatus},
};

/// Emitted once per step, right after it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub chain_id: ChainId,
    pub step_id: String,
    pub capability: CapabilityId,
    pub status: StepStatus,
    pub confidence: f64,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
}
