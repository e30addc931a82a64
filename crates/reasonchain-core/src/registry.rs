//! The capability registry: a fixed mapping from identifier to implementation.
//!
//! The hosting application builds the registry once at startup and shares it
//! behind an `Arc`. Besides lookups it owns the single fallback builder used
//! whenever a capability's real output is unavailable and a placeholder
//! report must stand in for it.

use std::{collections::BTreeMap, sync::Arc};

use serde_json::json;

use reasonchain_contracts::{
    analysis::{AnalysisInput, AnalysisReport},
    capability::CapabilityId,
    error::{ReasonchainError, ReasonchainResult},
};

use crate::traits::Capability;

/// Builds the placeholder report for a capability kind.
pub type FallbackBuilder =
    Arc<dyn Fn(&CapabilityId, &AnalysisInput) -> AnalysisReport + Send + Sync>;

/// Confidence carried by fallback reports.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

pub struct CapabilityRegistry {
    capabilities: BTreeMap<CapabilityId, Arc<dyn Capability>>,
    fallback: FallbackBuilder,
}

impl CapabilityRegistry {
    /// An empty registry using the generic fallback builder.
    pub fn new() -> Self {
        Self {
            capabilities: BTreeMap::new(),
            fallback: Arc::new(generic_fallback),
        }
    }

    /// Register `capability` under its own `id()`. Registering the same id
    /// twice replaces the previous implementation.
    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        self.capabilities.insert(capability.id(), capability);
    }

    /// Builder-style `register`.
    pub fn with(mut self, capability: Arc<dyn Capability>) -> Self {
        self.register(capability);
        self
    }

    /// Replace the fallback builder.
    pub fn with_fallback(mut self, builder: FallbackBuilder) -> Self {
        self.fallback = builder;
        self
    }

    pub fn get(&self, id: &CapabilityId) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(id).cloned()
    }

    pub fn contains(&self, id: &CapabilityId) -> bool {
        self.capabilities.contains_key(id)
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &CapabilityId> {
        self.capabilities.keys()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Fail with `Design` on the first identifier that is not registered.
    pub fn validate(&self, ids: &[CapabilityId]) -> ReasonchainResult<()> {
        match ids.iter().find(|id| !self.contains(id)) {
            Some(unknown) => Err(ReasonchainError::Design {
                reason: format!(
                    "unknown capability '{}' (registered: {})",
                    unknown,
                    self.ids().map(|id| id.as_str()).collect::<Vec<_>>().join(", ")
                ),
            }),
            None => Ok(()),
        }
    }

    /// The placeholder report for `id`.
    pub fn fallback(&self, id: &CapabilityId, input: &AnalysisInput) -> AnalysisReport {
        (self.fallback)(id, input)
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Fallback used when no domain-specific builder is injected.
pub fn generic_fallback(id: &CapabilityId, input: &AnalysisInput) -> AnalysisReport {
    AnalysisReport::new(
        id.clone(),
        json!({
            "fallback": true,
            "summary": format!("{} analysis unavailable; generic guidance applies", id),
            "topics": input.topics,
        }),
    )
    .with_confidence_score(FALLBACK_CONFIDENCE)
}
