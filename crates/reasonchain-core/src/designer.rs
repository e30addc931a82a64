//! The chain designer: turns a depth template (or a caller-supplied
//! capability list) into a `ReasoningChain` with dependency edges and
//! precomputed execution batches.
//!
//! Dependency edges per topology:
//!
//! - `sequential`, `debate`: step i depends on step i-1
//! - `iterative`: same declared edges as sequential; the executor
//!   widens the context to every earlier step
//! - `parallel`: no edges
//! - `hierarchical`: every step of level n depends on every step of
//!   level n-1; levels are input, never inferred
//!
//! Batches are Kahn levels over the dependency graph. Topologies that do not
//! fan out get one step per batch, in level order.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use reasonchain_contracts::{
    analysis::AnalysisInput,
    capability::CapabilityId,
    chain::{AnalysisDepth, ChainId, ReasoningChain, ReasoningStep, Topology},
    error::{ReasonchainError, ReasonchainResult},
};

use crate::registry::CapabilityRegistry;

/// Default capability set, topology, and level assignment for one depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthTemplate {
    pub capabilities: Vec<CapabilityId>,
    pub topology: Topology,
    /// Level assignment used when the chain runs hierarchically. Must cover
    /// `capabilities` exactly.
    #[serde(default)]
    pub levels: Option<Vec<Vec<CapabilityId>>>,
}

/// The built-in templates.
pub fn default_templates() -> BTreeMap<AnalysisDepth, DepthTemplate> {
    let s = CapabilityId::strategic;
    let c = CapabilityId::competitive;
    let r = CapabilityId::risk;
    let m = CapabilityId::market;
    let e = CapabilityId::executive;

    BTreeMap::from([
        (
            AnalysisDepth::Rapid,
            DepthTemplate {
                capabilities: vec![s()],
                topology: Topology::Sequential,
                levels: Some(vec![vec![s()]]),
            },
        ),
        (
            AnalysisDepth::Standard,
            DepthTemplate {
                capabilities: vec![s(), c(), e()],
                topology: Topology::Parallel,
                levels: Some(vec![vec![s(), c()], vec![e()]]),
            },
        ),
        (
            AnalysisDepth::Deep,
            DepthTemplate {
                capabilities: vec![s(), c(), r(), e()],
                topology: Topology::Hierarchical,
                levels: Some(vec![vec![s(), c(), r()], vec![e()]]),
            },
        ),
        (
            AnalysisDepth::Ultra,
            DepthTemplate {
                capabilities: vec![s(), c(), r(), m(), e()],
                topology: Topology::Hierarchical,
                levels: Some(vec![vec![s(), c(), r(), m()], vec![e()]]),
            },
        ),
    ])
}

/// Everything the designer needs to build one chain.
#[derive(Debug, Clone)]
pub struct DesignRequest {
    pub depth: AnalysisDepth,
    pub input: Arc<AnalysisInput>,
    /// Overrides the template's capability list.
    pub capabilities: Option<Vec<CapabilityId>>,
    /// Overrides the template's topology.
    pub topology: Option<Topology>,
    /// Explicit level assignment for hierarchical chains.
    pub levels: Option<Vec<Vec<CapabilityId>>>,
}

impl DesignRequest {
    pub fn new(depth: AnalysisDepth, input: Arc<AnalysisInput>) -> Self {
        Self {
            depth,
            input,
            capabilities: None,
            topology: None,
            levels: None,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Vec<CapabilityId>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = Some(topology);
        self
    }

    pub fn with_levels(mut self, levels: Vec<Vec<CapabilityId>>) -> Self {
        self.levels = Some(levels);
        self
    }
}

pub struct ChainDesigner {
    registry: Arc<CapabilityRegistry>,
    templates: BTreeMap<AnalysisDepth, DepthTemplate>,
}

impl ChainDesigner {
    /// A designer using the built-in depth templates.
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            templates: default_templates(),
        }
    }

    /// Replace the templates for the depths present in `templates`.
    pub fn with_templates(mut self, templates: BTreeMap<AnalysisDepth, DepthTemplate>) -> Self {
        self.templates.extend(templates);
        self
    }

    pub fn template(&self, depth: AnalysisDepth) -> ReasonchainResult<&DepthTemplate> {
        self.templates.get(&depth).ok_or_else(|| ReasonchainError::Design {
            reason: format!("no template configured for depth '{}'", depth),
        })
    }

    /// Build a chain for `request`.
    ///
    /// # Errors
    ///
    /// `Design` for an unregistered capability, a hierarchical chain without
    /// a usable level assignment, levels that disagree with an explicit
    /// capability list, or levels given for any other topology.
    pub fn design(&self, request: &DesignRequest) -> ReasonchainResult<ReasoningChain> {
        let template = self.template(request.depth)?;
        let topology = request.topology.unwrap_or(template.topology);
        if request.levels.is_some() && topology != Topology::Hierarchical {
            return Err(ReasonchainError::Design {
                reason: format!(
                    "a level assignment only applies to hierarchical chains, not '{}'",
                    topology
                ),
            });
        }

        let groups: Vec<Vec<CapabilityId>> = if topology == Topology::Hierarchical {
            let levels = match (&request.levels, &request.capabilities) {
                (Some(levels), _) => levels.clone(),
                (None, None) => template.levels.clone().ok_or_else(|| ReasonchainError::Design {
                    reason: format!(
                        "depth '{}' has no level assignment for a hierarchical chain",
                        request.depth
                    ),
                })?,
                (None, Some(_)) => {
                    return Err(ReasonchainError::Design {
                        reason: "a hierarchical chain over custom capabilities needs an explicit \
                                 level assignment"
                            .to_string(),
                    })
                }
            };
            if let Some(capabilities) = &request.capabilities {
                ensure_same_members(capabilities, &levels)?;
            }
            levels.into_iter().filter(|level| !level.is_empty()).collect()
        } else {
            let capabilities = request
                .capabilities
                .clone()
                .unwrap_or_else(|| template.capabilities.clone());
            capabilities.into_iter().map(|c| vec![c]).collect()
        };

        let mut steps: Vec<ReasoningStep> = Vec::new();
        let mut previous_level: Vec<String> = Vec::new();
        for level in &groups {
            let mut this_level = Vec::with_capacity(level.len());
            for capability in level {
                let step_id = format!("{:02}-{}", steps.len() + 1, capability);
                let dependencies = match topology {
                    Topology::Parallel => Vec::new(),
                    Topology::Hierarchical => previous_level.clone(),
                    Topology::Sequential | Topology::Iterative | Topology::Debate => steps
                        .last()
                        .map(|s| vec![s.step_id.clone()])
                        .unwrap_or_default(),
                };
                steps.push(ReasoningStep::new(
                    step_id.clone(),
                    capability.clone(),
                    Arc::clone(&request.input),
                    dependencies,
                ));
                this_level.push(step_id);
            }
            previous_level = this_level;
        }

        let name = format!("{}-{}-chain", request.depth, topology);
        self.assemble(name, topology, request.depth, steps)
    }

    /// Validate caller-built `steps` and wrap them into a chain with
    /// computed batches.
    pub fn assemble(
        &self,
        name: impl Into<String>,
        topology: Topology,
        depth: AnalysisDepth,
        steps: Vec<ReasoningStep>,
    ) -> ReasonchainResult<ReasoningChain> {
        let capabilities: Vec<CapabilityId> = steps.iter().map(|s| s.capability.clone()).collect();
        self.registry.validate(&capabilities)?;

        let batches = plan_batches(&steps, topology)?;
        let chain = ReasoningChain {
            chain_id: ChainId::new(),
            name: name.into(),
            topology,
            depth,
            steps,
            batches,
            overall_confidence: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        debug!(
            chain_id = %chain.chain_id,
            name = %chain.name,
            steps = chain.steps.len(),
            batches = chain.batches.len(),
            "chain designed"
        );
        Ok(chain)
    }
}

fn ensure_same_members(
    capabilities: &[CapabilityId],
    levels: &[Vec<CapabilityId>],
) -> ReasonchainResult<()> {
    let mut listed: Vec<&CapabilityId> = capabilities.iter().collect();
    let mut leveled: Vec<&CapabilityId> = levels.iter().flatten().collect();
    listed.sort();
    leveled.sort();
    if listed != leveled {
        return Err(ReasonchainError::Design {
            reason: "level assignment does not cover the requested capabilities exactly".to_string(),
        });
    }
    Ok(())
}

/// Compute execution batches for `steps`.
///
/// # Errors
///
/// `Design` for a duplicate step id, a dependency on a step that is not in
/// the list, or a dependency cycle.
pub fn plan_batches(steps: &[ReasoningStep], topology: Topology) -> ReasonchainResult<Vec<Vec<String>>> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        if index.insert(step.step_id.as_str(), i).is_some() {
            return Err(ReasonchainError::Design {
                reason: format!("duplicate step id '{}'", step.step_id),
            });
        }
    }

    let mut indegree = vec![0usize; steps.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];
    for (i, step) in steps.iter().enumerate() {
        let unique: BTreeSet<&str> = step.dependencies.iter().map(String::as_str).collect();
        for dep in unique {
            let Some(&d) = index.get(dep) else {
                return Err(ReasonchainError::Design {
                    reason: format!("step '{}' depends on unknown step '{}'", step.step_id, dep),
                });
            };
            indegree[i] += 1;
            dependents[d].push(i);
        }
    }

    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..steps.len()).filter(|&i| indegree[i] == 0).collect();
    let mut scheduled = 0;
    while !current.is_empty() {
        scheduled += current.len();
        let mut next = Vec::new();
        for &i in &current {
            for &dependent in &dependents[i] {
                indegree[dependent] -= 1;
                if indegree[dependent] == 0 {
                    next.push(dependent);
                }
            }
        }
        next.sort_unstable();
        levels.push(std::mem::replace(&mut current, next));
    }

    if scheduled < steps.len() {
        let placed: HashSet<usize> = levels.iter().flatten().copied().collect();
        let stuck: Vec<&str> = (0..steps.len())
            .filter(|i| !placed.contains(i))
            .map(|i| steps[i].step_id.as_str())
            .collect();
        return Err(ReasonchainError::Design {
            reason: format!("dependency cycle among steps: {}", stuck.join(", ")),
        });
    }

    let id = |i: usize| steps[i].step_id.clone();
    let batches = if topology.is_concurrent() {
        levels.into_iter().map(|level| level.into_iter().map(id).collect()).collect()
    } else {
        levels.into_iter().flatten().map(|i| vec![id(i)]).collect()
    };
    Ok(batches)
}
