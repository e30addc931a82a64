//! # reasonchain-contracts
//!
//! Shared types, result shapes, and error taxonomy for the reasoning chain
//! orchestrator.
//!
//! All crates in the workspace import from here. No orchestration logic lives
//! in this crate: only data definitions and error types.

pub mod analysis;
pub mod capability;
pub mod chain;
pub mod error;
pub mod orchestration;
pub mod progress;
