//! # reasonchain-progress
//!
//! Append-only, SHA-256 hash-chained record of step progress events.
//!
//! `InMemoryProgressRecorder` implements `ProgressSink`, so it can be handed
//! to the orchestrator like any other sink. Each event is wrapped in a
//! `ProgressEntry` that links to the previous entry by hash; altering a
//! stored entry breaks the chain and `verify_integrity` reports it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reasonchain_progress::InMemoryProgressRecorder;
//!
//! let recorder = Arc::new(InMemoryProgressRecorder::new("run-001"));
//! let orchestrator = Orchestrator::new(registry).with_progress(recorder.clone());
//! orchestrator.orchestrate(request).await?;
//!
//! assert!(recorder.verify_integrity());
//! let log = recorder.export_log();
//! ```

pub mod chain;
pub mod entry;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use entry::{ProgressEntry, ProgressLog};
pub use memory::InMemoryProgressRecorder;

// ── Tests ─────────────────────────────────────────────────────────────────────
