//! Placeholder reports, one shape per capability kind.
//!
//! Every fallback carries the same fields the real capability would, filled
//! with neutral values, plus `"fallback": true`. Synthesis over fallbacks
//! therefore reads real-looking fields instead of placeholders.

use serde_json::{json, Value};

use reasonchain_contracts::{
    analysis::{AnalysisInput, AnalysisReport},
    capability::{known, CapabilityId},
};
use reasonchain_core::registry::{generic_fallback, FALLBACK_CONFIDENCE};

fn payload(id: &CapabilityId) -> Option<Value> {
    let body = match id.as_str() {
        known::STRATEGIC => json!({
            "key_trends": ["no trend could be established"],
            "strategic_recommendations": ["hold the current course until analysis completes"],
        }),
        known::COMPETITIVE => json!({
            "competitors": [],
            "market_gaps": [],
        }),
        known::RISK => json!({
            "risks": [],
            "overall_risk_level": "unassessed",
        }),
        known::MARKET => json!({
            "predictions": [],
            "market_outlook": "unknown",
        }),
        known::EXECUTIVE => json!({
            "key_recommendations": ["re-run the analysis before committing resources"],
        }),
        _ => return None,
    };
    Some(body)
}

/// Fallback builder for the market capabilities. Unknown kinds get the
/// registry's generic fallback.
pub fn market_fallback(id: &CapabilityId, input: &AnalysisInput) -> AnalysisReport {
    let Some(mut body) = payload(id) else {
        return generic_fallback(id, input);
    };
    if let Value::Object(map) = &mut body {
        map.insert("fallback".to_string(), json!(true));
        map.insert("topics".to_string(), json!(input.topics));
    }
    AnalysisReport::new(id.clone(), body).with_confidence_score(FALLBACK_CONFIDENCE)
}
