//! Analysis inputs and result shapes.
//!
//! Capabilities return heterogeneous, capability-defined payloads. The
//! orchestrator only ever reads the small set of well-known fields on
//! `AnalysisReport`; everything else travels in the opaque `payload`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::CapabilityId;

/// One text-bearing record of analysis content (an article, a post, a note).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Where the record came from (feed name, URL, author handle).
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
    /// Free-form producer metadata. Never inspected by the orchestrator.
    #[serde(default)]
    pub metadata: Value,
}

impl ContentRecord {
    pub fn new(source: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            title: title.into(),
            text: text.into(),
            metadata: Value::Null,
        }
    }
}

/// The content and focus topics shared by every step of one orchestration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub content: Vec<ContentRecord>,
    /// Ordered topics guiding the analysis focus.
    pub topics: Vec<String>,
}

impl AnalysisInput {
    pub fn new(content: Vec<ContentRecord>, topics: Vec<String>) -> Self {
        Self { content, topics }
    }
}

/// A successful capability result.
///
/// The three confidence fields are the only recognized ones, checked in
/// declaration order by the confidence aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub capability: CapabilityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_confidence: Option<f64>,
    /// Capability-defined body.
    #[serde(default)]
    pub payload: Value,
}

impl AnalysisReport {
    /// A report with no recognized confidence field and the given payload.
    pub fn new(capability: CapabilityId, payload: Value) -> Self {
        Self {
            capability,
            confidence_score: None,
            synthesis_confidence: None,
            overall_confidence: None,
            payload,
        }
    }

    pub fn with_confidence_score(mut self, score: f64) -> Self {
        self.confidence_score = Some(score);
        self
    }

    pub fn with_synthesis_confidence(mut self, score: f64) -> Self {
        self.synthesis_confidence = Some(score);
        self
    }

    pub fn with_overall_confidence(mut self, score: f64) -> Self {
        self.overall_confidence = Some(score);
        self
    }

    /// Resolve a dot-notation path (e.g. `"competitors.0.name"`) against the
    /// payload. Numeric segments index into arrays. Returns `None` when any
    /// segment is missing or the value is JSON `null`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut current = &self.payload;
        for segment in path.split('.') {
            let next = match current {
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                other => other.get(segment),
            };
            match next {
                Some(v) if !v.is_null() => current = v,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Like `lookup`, but only yields non-empty strings.
    pub fn text(&self, path: &str) -> Option<&str> {
        self.lookup(path)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// The error-shaped result a failed step carries instead of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub capability: CapabilityId,
    pub error: String,
}

/// The output of one step: either the capability's report or the failure
/// the step executor recorded in its place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalysisResult {
    Report(AnalysisReport),
    Failure(AnalysisFailure),
}

impl AnalysisResult {
    pub fn capability(&self) -> &CapabilityId {
        match self {
            AnalysisResult::Report(report) => &report.capability,
            AnalysisResult::Failure(failure) => &failure.capability,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, AnalysisResult::Failure(_))
    }

    pub fn as_report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisResult::Report(report) => Some(report),
            AnalysisResult::Failure(_) => None,
        }
    }
}

/// Outputs of a step's dependencies, keyed by `step_id`.
///
/// Failed dependencies are present with their failure payload; a dependent
/// step decides for itself what to make of them.
pub type DependencyContext = BTreeMap<String, AnalysisResult>;
