//! # reasonchain-config
//!
//! TOML-driven configuration for the reasoning chain orchestrator.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use reasonchain_config::OrchestratorConfig;
//!
//! let config = OrchestratorConfig::from_file(Path::new("reasonchain.toml"))?;
//! // Pass `config` to `reasonchain_runtime::Orchestrator::with_config(...)`.
//! ```
//!
//! An empty document yields the built-in defaults, so callers can ship a
//! file that only overrides what they care about.

pub mod loader;
pub mod settings;

pub use loader::OrchestratorConfig;
pub use settings::{ConfigFile, ExecutionSettings};

// ── Tests ─────────────────────────────────────────────────────────────────────
