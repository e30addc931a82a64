//! Configuration file schema.
//!
//! Every section is optional. A missing section, or a missing key within a
//! section, takes the built-in default.
//!
//! Example:
//! ```toml
//! [confidence]
//! bonus_cap = 0.1
//!
//! [execution]
//! step_timeout_ms = 30000
//!
//! [depth.deep]
//! capabilities = ["strategic", "competitive", "risk", "executive"]
//! topology     = "hierarchical"
//! levels       = [["strategic", "competitive", "risk"], ["executive"]]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reasonchain_core::{confidence::ConfidencePolicy, designer::DepthTemplate};
use reasonchain_synthesis::SynthesisLimits;

/// Execution knobs that are not part of chain design.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionSettings {
    /// Per-step deadline. Absent means steps may run indefinitely.
    pub step_timeout_ms: Option<u64>,
}

/// The top-level structure deserialized from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub confidence: ConfidencePolicy,
    pub synthesis: SynthesisLimits,
    pub execution: ExecutionSettings,
    /// Template overrides keyed by depth name (`rapid`, `standard`, `deep`,
    /// `ultra`). Depths not listed keep their built-in template.
    pub depth: BTreeMap<String, DepthTemplate>,
}
