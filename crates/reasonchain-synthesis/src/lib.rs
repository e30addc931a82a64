//! # reasonchain-synthesis
//!
//! Turns the per-capability results of one orchestration into a
//! cross-capability `SynthesisResult` and a presentation-ordered list of
//! recommendations.
//!
//! Synthesis is deterministic and never fails: missing payload fields are
//! replaced by placeholder text, and a run where nothing succeeded still
//! yields a `basic` synthesis at the empty floor confidence.

mod findings;

pub mod engine;
pub mod recommend;

pub use engine::{SynthesisEngine, SynthesisLimits};
pub use recommend::{generic_recommendations, RecommendationSynthesizer};
