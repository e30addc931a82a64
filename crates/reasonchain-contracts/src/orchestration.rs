//! Synthesis and orchestration result envelopes.
//!
//! `OrchestrationResult` is what the facade hands back to the caller. It is
//! built once per call and never touched again by the orchestrator.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::AnalysisResult,
    capability::CapabilityId,
    chain::{AnalysisDepth, ReasoningChain, Topology},
};

/// Unique identifier for one orchestration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrchestrationId(pub uuid::Uuid);

impl OrchestrationId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for OrchestrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrchestrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The rule the synthesis engine selected for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPattern {
    FullSpectrum,
    CompetitiveMarket,
    RiskPrediction,
    StrategicCompetitive,
    Basic,
}

impl SynthesisPattern {
    pub fn as_str(self) -> &'static str {
        match self {
            SynthesisPattern::FullSpectrum => "full_spectrum",
            SynthesisPattern::CompetitiveMarket => "competitive_market",
            SynthesisPattern::RiskPrediction => "risk_prediction",
            SynthesisPattern::StrategicCompetitive => "strategic_competitive",
            SynthesisPattern::Basic => "basic",
        }
    }
}

impl fmt::Display for SynthesisPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-capability synthesis over the results of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub pattern: SynthesisPattern,
    /// Bounded list of insight sentences.
    pub insights: Vec<String>,
    pub confidence: f64,
    /// Capabilities whose non-error results fed the synthesis.
    pub capabilities: Vec<CapabilityId>,
}

/// The top-level output of one orchestration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub orchestration_id: OrchestrationId,
    pub depth: AnalysisDepth,
    pub topology: Topology,
    /// Output of every capability that ran, including failed ones.
    pub results: BTreeMap<CapabilityId, AnalysisResult>,
    pub chains: Vec<ReasoningChain>,
    pub synthesis: SynthesisResult,
    pub recommendations: Vec<String>,
    /// Run-level confidence, equal to the synthesis confidence.
    pub confidence: f64,
    /// True only when the facade had to fall back to a generic result.
    pub degraded: bool,
    pub timestamp: DateTime<Utc>,
}
