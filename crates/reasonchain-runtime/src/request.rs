//! The caller's half of an orchestration call.

use reasonchain_contracts::{
    analysis::{AnalysisInput, ContentRecord},
    capability::CapabilityId,
    chain::{AnalysisDepth, Topology},
};

#[derive(Debug, Clone)]
pub struct OrchestrationRequest {
    pub content: Vec<ContentRecord>,
    pub topics: Vec<String>,
    pub depth: AnalysisDepth,
    pub topology: Option<Topology>,
    pub capabilities: Option<Vec<CapabilityId>>,
    /// Level assignment for a hierarchical run over custom capabilities.
    pub levels: Option<Vec<Vec<CapabilityId>>>,
}

impl OrchestrationRequest {
    pub fn new(depth: AnalysisDepth, content: Vec<ContentRecord>, topics: Vec<String>) -> Self {
        Self {
            content,
            topics,
            depth,
            topology: None,
            capabilities: None,
            levels: None,
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<CapabilityId>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn with_levels(mut self, levels: Vec<Vec<CapabilityId>>) -> Self {
        self.levels = Some(levels);
        self
    }

    pub(crate) fn analysis_input(&self) -> AnalysisInput {
        AnalysisInput::new(self.content.clone(), self.topics.clone())
    }
}
