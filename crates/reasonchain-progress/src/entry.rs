//! Progress entry and log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reasonchain_contracts::progress::ProgressEvent;

/// One link of the progress chain.
///
/// Changing any field, including those of the embedded event, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    pub recorder_id: String,
    pub event: ProgressEvent,
    /// `this_hash` of the previous entry, or `GENESIS_HASH` for the first.
    pub prev_hash: String,
    pub this_hash: String,
}

impl ProgressEntry {
    /// 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A sealed copy of everything a recorder has seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressLog {
    pub recorder_id: String,
    pub entries: Vec<ProgressEntry>,
    pub exported_at: DateTime<Utc>,
    /// `this_hash` of the last entry. Empty when no entry was recorded.
    pub terminal_hash: String,
}
