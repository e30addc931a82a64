//! In-memory implementation of `ProgressSink`.
//!
//! Entries live in a `Vec` behind a `Mutex`, so the recorder can be shared
//! by steps that finish concurrently. Arrival order is chain order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use reasonchain_contracts::{error::ReasonchainResult, progress::ProgressEvent};
use reasonchain_core::traits::ProgressSink;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{ProgressEntry, ProgressLog},
};

pub(crate) struct RecorderState {
    pub(crate) entries: Vec<ProgressEntry>,
    /// `this_hash` of the last entry, or `GENESIS_HASH` before the first.
    pub(crate) last_hash: String,
}

/// Append-only, hash-chained progress recorder.
pub struct InMemoryProgressRecorder {
    recorder_id: String,
    pub(crate) state: Mutex<RecorderState>,
}

impl InMemoryProgressRecorder {
    pub fn new(recorder_id: impl Into<String>) -> Self {
        Self {
            recorder_id: recorder_id.into(),
            state: Mutex::new(RecorderState {
                entries: Vec::new(),
                last_hash: ProgressEntry::GENESIS_HASH.to_string(),
            }),
        }
    }

    pub fn recorder_id(&self) -> &str {
        &self.recorder_id
    }

    // Entries are pushed whole, so a poisoned lock still guards a valid chain.
    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A sealed copy of every entry recorded so far.
    pub fn export_log(&self) -> ProgressLog {
        let state = self.lock();
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        info!(
            recorder_id = %self.recorder_id,
            entry_count = state.entries.len(),
            terminal_hash = %terminal_hash,
            "progress log exported"
        );

        ProgressLog {
            recorder_id: self.recorder_id.clone(),
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.lock().entries)
    }
}

impl ProgressSink for InMemoryProgressRecorder {
    fn on_step(&self, event: &ProgressEvent) -> ReasonchainResult<()> {
        let mut state = self.lock();

        let sequence = state.entries.len() as u64;
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_entry(&self.recorder_id, sequence, event, &prev_hash)?;

        debug!(
            recorder_id = %self.recorder_id,
            sequence,
            step_id = %event.step_id,
            status = %event.status,
            "progress recorded"
        );

        state.entries.push(ProgressEntry {
            sequence,
            recorder_id: self.recorder_id.clone(),
            event: event.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(())
    }
}
