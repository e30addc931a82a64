//! Capability identifiers.
//!
//! A capability is a pluggable analysis unit. The orchestrator never looks
//! inside one; it only schedules it by identifier and reads the result it
//! produces.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifiers of the capabilities the synthesis patterns know about.
///
/// Registries may hold capabilities under any other name too; those simply
/// never participate in a named synthesis pattern.
pub mod known {
    pub const STRATEGIC: &str = "strategic";
    pub const COMPETITIVE: &str = "competitive";
    pub const RISK: &str = "risk";
    pub const MARKET: &str = "market";
    pub const EXECUTIVE: &str = "executive";
}

/// Stable identifier for a capability.
///
/// Used by depth templates, the registry, and as the key of the
/// per-capability result map.
/// Example: CapabilityId("competitive")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(pub String);

impl CapabilityId {
    /// Construct an identifier from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn strategic() -> Self {
        Self::new(known::STRATEGIC)
    }

    pub fn competitive() -> Self {
        Self::new(known::COMPETITIVE)
    }

    pub fn risk() -> Self {
        Self::new(known::RISK)
    }

    pub fn market() -> Self {
        Self::new(known::MARKET)
    }

    pub fn executive() -> Self {
        Self::new(known::EXECUTIVE)
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for CapabilityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CapabilityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
