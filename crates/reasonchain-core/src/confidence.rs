//! Confidence aggregation.
//!
//! Every function here is pure: the same inputs always yield the same value,
//! and nothing is mutated.
//!
//! Per-step confidence reads the first recognized field of a report in the
//! order `confidence_score`, `synthesis_confidence`, `overall_confidence`,
//! clamps it to [0,1], and falls back to `default_confidence`. A failed step
//! scores 0.
//!
//! Aggregate confidence is the arithmetic mean plus a multi-capability bonus
//! of `min(bonus_per_step × completed, bonus_cap)`, capped at 1.0. With no
//! completed step at all the result is the fixed `empty_floor`.
//!
//! In an iterative chain a later step of a capability refines the earlier
//! ones, so only the latest completed step per capability (or the latest
//! step, if none completed) enters the chain mean.

use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use reasonchain_contracts::{
    analysis::{AnalysisReport, AnalysisResult},
    capability::CapabilityId,
    chain::{ReasoningStep, StepStatus, Topology},
};

/// Constants driving confidence aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    /// Used when a report carries no recognized confidence field.
    pub default_confidence: f64,
    pub bonus_per_step: f64,
    pub bonus_cap: f64,
    /// Returned when nothing completed. Distinct from 0, which would read as
    /// "actively disproven".
    pub empty_floor: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            default_confidence: 0.5,
            bonus_per_step: 0.05,
            bonus_cap: 0.2,
            empty_floor: 0.3,
        }
    }
}

fn normalize(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

/// Confidence of a successful report.
pub fn report_confidence(report: &AnalysisReport, policy: &ConfidencePolicy) -> f64 {
    [
        report.confidence_score,
        report.synthesis_confidence,
        report.overall_confidence,
    ]
    .into_iter()
    .flatten()
    .find_map(normalize)
    .unwrap_or(policy.default_confidence)
}

/// Confidence of any step output. Failures score 0.
pub fn result_confidence(result: &AnalysisResult, policy: &ConfidencePolicy) -> f64 {
    match result {
        AnalysisResult::Report(report) => report_confidence(report, policy),
        AnalysisResult::Failure(_) => 0.0,
    }
}

/// Mean of `confidences` plus the bounded multi-capability bonus for
/// `completed` successful contributors.
pub fn aggregate(confidences: &[f64], completed: usize, policy: &ConfidencePolicy) -> f64 {
    if completed == 0 || confidences.is_empty() {
        return policy.empty_floor;
    }
    let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
    let bonus = (policy.bonus_per_step * completed as f64).min(policy.bonus_cap);
    (mean + bonus).clamp(0.0, 1.0)
}

/// Chain-level confidence: the mean runs over every contributing step,
/// failed ones included, while only completed steps earn the bonus.
pub fn chain_confidence(
    topology: Topology,
    steps: &[ReasoningStep],
    policy: &ConfidencePolicy,
) -> f64 {
    let contributing: Vec<&ReasoningStep> = if topology == Topology::Iterative {
        latest_refinements(steps)
    } else {
        steps.iter().collect()
    };
    let confidences: Vec<f64> = contributing.iter().map(|s| s.confidence).collect();
    let completed = contributing
        .iter()
        .filter(|s| s.status() == StepStatus::Completed)
        .count();
    aggregate(&confidences, completed, policy)
}

/// One step per capability: the last completed one, else the last one.
fn latest_refinements(steps: &[ReasoningStep]) -> Vec<&ReasoningStep> {
    let mut latest: BTreeMap<&CapabilityId, &ReasoningStep> = BTreeMap::new();
    for step in steps {
        let replace = match latest.get(&step.capability) {
            Some(current) => {
                step.status() == StepStatus::Completed
                    || current.status() != StepStatus::Completed
            }
            None => true,
        };
        if replace {
            latest.insert(&step.capability, step);
        }
    }
    latest.into_values().collect()
}

/// Run-level confidence over a result set. Only non-error results count.
pub fn run_confidence<'a>(
    results: impl IntoIterator<Item = &'a AnalysisResult>,
    policy: &ConfidencePolicy,
) -> f64 {
    let confidences: Vec<f64> = results
        .into_iter()
        .filter_map(AnalysisResult::as_report)
        .map(|r| report_confidence(r, policy))
        .collect();
    aggregate(&confidences, confidences.len(), policy)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use reasonchain_contracts::{
        analysis::{AnalysisFailure, AnalysisInput},
        capability::CapabilityId,
    };

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn report(score: Option<f64>) -> AnalysisReport {
        let r = AnalysisReport::new(CapabilityId::strategic(), json!({}));
        match score {
            Some(s) => r.with_confidence_score(s),
            None => r,
        }
    }

    fn sequential(steps: &[ReasoningStep]) -> f64 {
        chain_confidence(Topology::Sequential, steps, &ConfidencePolicy::default())
    }

    fn step(status: StepStatus, confidence: f64) -> ReasoningStep {
        step_of(CapabilityId::risk(), status, confidence)
    }

    fn step_of(capability: CapabilityId, status: StepStatus, confidence: f64) -> ReasoningStep {
        let mut s = ReasoningStep::new(
            "s",
            capability,
            Arc::new(AnalysisInput::default()),
            vec![],
        );
        if status != StepStatus::Pending {
            s.transition(StepStatus::Running).unwrap();
            s.transition(status).unwrap();
        }
        s.confidence = confidence;
        s
    }

    #[test]
    fn recognized_fields_follow_priority_order() {
        let policy = ConfidencePolicy::default();
        let r = AnalysisReport::new(CapabilityId::market(), json!({}))
            .with_overall_confidence(0.2)
            .with_synthesis_confidence(0.6);
        assert!(close(report_confidence(&r, &policy), 0.6));

        let r = r.with_confidence_score(0.8);
        assert!(close(report_confidence(&r, &policy), 0.8));
    }

    #[test]
    fn missing_field_defaults_to_half() {
        assert!(close(report_confidence(&report(None), &ConfidencePolicy::default()), 0.5));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let policy = ConfidencePolicy::default();
        assert!(close(report_confidence(&report(Some(1.7)), &policy), 1.0));
        assert!(close(report_confidence(&report(Some(-0.4)), &policy), 0.0));
    }

    #[test]
    fn non_finite_field_is_skipped() {
        let r = AnalysisReport::new(CapabilityId::market(), json!({}))
            .with_confidence_score(f64::NAN)
            .with_overall_confidence(0.4);
        assert!(close(report_confidence(&r, &ConfidencePolicy::default()), 0.4));
    }

    #[test]
    fn failure_scores_zero() {
        let failure = AnalysisResult::Failure(AnalysisFailure {
            capability: CapabilityId::risk(),
            error: "boom".to_string(),
        });
        assert_eq!(result_confidence(&failure, &ConfidencePolicy::default()), 0.0);
    }

    #[test]
    fn single_completed_step_gets_one_bonus() {
        let steps = vec![step(StepStatus::Completed, 0.9)];
        assert!(close(sequential(&steps), 0.95));
    }

    #[test]
    fn bonus_is_capped() {
        let steps: Vec<_> = (0..6).map(|_| step(StepStatus::Completed, 0.5)).collect();
        assert!(close(sequential(&steps), 0.7));
    }

    #[test]
    fn total_is_capped_at_one() {
        let steps: Vec<_> = (0..3).map(|_| step(StepStatus::Completed, 0.99)).collect();
        assert!(close(sequential(&steps), 1.0));
    }

    #[test]
    fn empty_chain_yields_floor() {
        assert!(close(sequential(&[]), 0.3));
    }

    #[test]
    fn all_failed_chain_yields_floor() {
        let steps: Vec<_> = (0..5).map(|_| step(StepStatus::Failed, 0.0)).collect();
        assert!(close(sequential(&steps), 0.3));
    }

    #[test]
    fn failed_steps_drag_the_mean() {
        let steps = vec![step(StepStatus::Completed, 0.8), step(StepStatus::Failed, 0.0)];
        // mean 0.4 + one bonus 0.05
        assert!(close(sequential(&steps), 0.45));
    }

    #[test]
    fn run_confidence_ignores_failures() {
        let policy = ConfidencePolicy::default();
        let results = vec![
            AnalysisResult::Report(report(Some(0.7))),
            AnalysisResult::Failure(AnalysisFailure {
                capability: CapabilityId::risk(),
                error: "boom".to_string(),
            }),
        ];
        assert!(close(run_confidence(&results, &policy), 0.75));
        assert!(close(run_confidence(&[], &policy), 0.3));
    }

    #[test]
    fn aggregation_is_repeatable() {
        let policy = ConfidencePolicy::default();
        let steps = vec![step(StepStatus::Completed, 0.62), step(StepStatus::Completed, 0.41)];
        let first = chain_confidence(Topology::Sequential, &steps, &policy);
        let second = chain_confidence(Topology::Sequential, &steps, &policy);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn iterative_refinement_supersedes_earlier_step() {
        let policy = ConfidencePolicy::default();
        let steps = vec![
            step_of(CapabilityId::risk(), StepStatus::Completed, 0.4),
            step_of(CapabilityId::market(), StepStatus::Completed, 0.6),
            step_of(CapabilityId::risk(), StepStatus::Completed, 0.8),
        ];
        // mean(0.6, 0.8) + two bonuses
        assert!(close(chain_confidence(Topology::Iterative, &steps, &policy), 0.8));
        // mean(0.4, 0.6, 0.8) + three bonuses
        assert!(close(chain_confidence(Topology::Sequential, &steps, &policy), 0.75));
    }

    #[test]
    fn failed_refinement_keeps_the_earlier_success() {
        let policy = ConfidencePolicy::default();
        let steps = vec![
            step_of(CapabilityId::risk(), StepStatus::Completed, 0.7),
            step_of(CapabilityId::risk(), StepStatus::Failed, 0.0),
        ];
        assert!(close(chain_confidence(Topology::Iterative, &steps, &policy), 0.75));
        assert!(close(chain_confidence(Topology::Sequential, &steps, &policy), 0.4));
    }
}
