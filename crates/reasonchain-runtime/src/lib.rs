//! # reasonchain-runtime
//!
//! The single entry point of the reasoning chain orchestrator.
//!
//! [`Orchestrator::orchestrate`] designs a chain for the requested depth (or
//! explicit capability list and topology), executes it, synthesizes the
//! per-capability results and assembles recommendations.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reasonchain_runtime::{Orchestrator, OrchestrationRequest};
//!
//! let orchestrator = Orchestrator::new(Arc::new(registry)).with_config(config);
//! let result = orchestrator
//!     .orchestrate(OrchestrationRequest::new(AnalysisDepth::Deep, content, topics))
//!     .await?;
//! println!("{} → {:.2}", result.synthesis.pattern, result.confidence);
//! ```

pub mod orchestrator;
pub mod request;

pub use orchestrator::{OrchestrationPhase, Orchestrator};
pub use request::OrchestrationRequest;
