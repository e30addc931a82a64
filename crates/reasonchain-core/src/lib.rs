//! # reasonchain-core
//!
//! The execution engine of the reasoning chain orchestrator.
//!
//! This crate provides:
//! - The `Capability` and `ProgressSink` traits
//! - The `CapabilityRegistry` and its injected fallback builder
//! - The `ChainDesigner`, which turns a depth or capability list into a chain
//! - The `StepExecutor` and `ChainExecutor`, which run chains per topology
//! - The pure confidence aggregation functions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reasonchain_core::{ChainDesigner, ChainExecutor, StepExecutor, designer::DesignRequest};
//!
//! let designer = ChainDesigner::new(registry.clone());
//! let mut chain = designer.design(&DesignRequest::new(AnalysisDepth::Deep, input))?;
//! ChainExecutor::new(Arc::new(StepExecutor::new(registry))).execute(&mut chain).await?;
//! ```

pub mod confidence;
pub mod designer;
pub mod executor;
pub mod progress;
pub mod registry;
pub mod step;
pub mod traits;

pub use confidence::ConfidencePolicy;
pub use designer::ChainDesigner;
pub use executor::ChainExecutor;
pub use registry::CapabilityRegistry;
pub use step::StepExecutor;
