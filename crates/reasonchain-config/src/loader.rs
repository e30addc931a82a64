//! Loading and validating `OrchestratorConfig`.
//!
//! `OrchestratorConfig` is the resolved form of a `ConfigFile`: depth keys
//! parsed into `AnalysisDepth`, file templates merged over the built-in
//! ones, and the timeout converted to a `Duration`.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    time::Duration,
};

use tracing::debug;

use reasonchain_contracts::{
    capability::CapabilityId,
    chain::{AnalysisDepth, Topology},
    error::{ReasonchainError, ReasonchainResult},
};
use reasonchain_core::{
    confidence::ConfidencePolicy,
    designer::{default_templates, DepthTemplate},
};
use reasonchain_synthesis::SynthesisLimits;

use crate::settings::ConfigFile;

fn config_error(reason: impl Into<String>) -> ReasonchainError {
    ReasonchainError::Config {
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub confidence: ConfidencePolicy,
    pub synthesis: SynthesisLimits,
    pub step_timeout: Option<Duration>,
    pub templates: BTreeMap<AnalysisDepth, DepthTemplate>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confidence: ConfidencePolicy::default(),
            synthesis: SynthesisLimits::default(),
            step_timeout: None,
            templates: default_templates(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse `s` as TOML, merge it over the defaults and validate the result.
    ///
    /// Returns `ReasonchainError::Config` if the TOML is malformed, names an
    /// unknown depth, or fails `validate`.
    pub fn from_toml_str(s: &str) -> ReasonchainResult<Self> {
        let file: ConfigFile = toml::from_str(s)
            .map_err(|e| config_error(format!("failed to parse orchestrator TOML: {}", e)))?;
        Self::from_file_settings(file)
    }

    pub fn from_file(path: &Path) -> ReasonchainResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&contents)
    }

    fn from_file_settings(file: ConfigFile) -> ReasonchainResult<Self> {
        let mut templates = default_templates();
        for (name, template) in file.depth {
            let depth: AnalysisDepth = name
                .parse()
                .map_err(|_| config_error(format!("unknown depth '{}' in [depth] table", name)))?;
            debug!(depth = %depth, topology = %template.topology, "depth template overridden");
            templates.insert(depth, template);
        }

        let config = Self {
            confidence: file.confidence,
            synthesis: file.synthesis,
            step_timeout: file.execution.step_timeout_ms.map(Duration::from_millis),
            templates,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and template consistency.
    pub fn validate(&self) -> ReasonchainResult<()> {
        let policy = &self.confidence;
        for (name, value) in [
            ("default_confidence", policy.default_confidence),
            ("bonus_per_step", policy.bonus_per_step),
            ("bonus_cap", policy.bonus_cap),
            ("empty_floor", policy.empty_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(config_error(format!(
                    "confidence.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.step_timeout == Some(Duration::ZERO) {
            return Err(config_error("execution.step_timeout_ms must be positive"));
        }

        for (depth, template) in &self.templates {
            validate_template(*depth, template)?;
        }
        Ok(())
    }
}

fn validate_template(depth: AnalysisDepth, template: &DepthTemplate) -> ReasonchainResult<()> {
    if template.capabilities.is_empty() {
        return Err(config_error(format!(
            "depth '{}' lists no capabilities",
            depth
        )));
    }

    match &template.levels {
        Some(levels) => {
            if levels.iter().any(Vec::is_empty) {
                return Err(config_error(format!(
                    "depth '{}' has an empty level",
                    depth
                )));
            }
            if multiset(levels.iter().flatten()) != multiset(template.capabilities.iter()) {
                return Err(config_error(format!(
                    "levels of depth '{}' do not cover its capabilities exactly",
                    depth
                )));
            }
        }
        None if template.topology == Topology::Hierarchical => {
            return Err(config_error(format!(
                "depth '{}' is hierarchical but declares no levels",
                depth
            )));
        }
        None => {}
    }
    Ok(())
}

fn multiset<'a>(ids: impl Iterator<Item = &'a CapabilityId>) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id.as_str()).or_insert(0) += 1;
    }
    counts
}
