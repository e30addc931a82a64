//! Hashing and chain verification.
//!
//! Hash input layout (bytes, in order):
//!   1. recorder_id as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. compact JSON of the progress event

use sha2::{Digest, Sha256};

use reasonchain_contracts::{
    error::{ReasonchainError, ReasonchainResult},
    progress::ProgressEvent,
};

use crate::entry::ProgressEntry;

/// SHA-256 of one entry's content as a lowercase 64-character hex string.
pub fn hash_entry(
    recorder_id: &str,
    sequence: u64,
    event: &ProgressEvent,
    prev_hash: &str,
) -> ReasonchainResult<String> {
    let event_json = serde_json::to_vec(event).map_err(|e| ReasonchainError::ProgressSink {
        reason: format!("progress event is not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(recorder_id.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&event_json);

    Ok(hex::encode(hasher.finalize()))
}

/// True when every entry links to its predecessor (the genesis hash for the
/// first), carries the expected sequence number, and its `this_hash` matches
/// the recomputed value. An empty chain is valid.
pub fn verify_chain(entries: &[ProgressEntry]) -> bool {
    let mut expected_prev = ProgressEntry::GENESIS_HASH.to_string();

    for (position, entry) in entries.iter().enumerate() {
        if entry.sequence != position as u64 || entry.prev_hash != expected_prev {
            return false;
        }

        match hash_entry(&entry.recorder_id, entry.sequence, &entry.event, &entry.prev_hash) {
            Ok(recomputed) if recomputed == entry.this_hash => {}
            _ => return false,
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
