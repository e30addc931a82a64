//! The five reference capabilities.
//!
//! Each one is deterministic over its input: the same content, topics and
//! dependency context always produce the same report. Empty content is a
//! capability error, which the step executor records as a failed step.

mod competitive;
mod executive;
mod market;
mod risk;
mod strategic;

pub use competitive::CompetitiveCapability;
pub use executive::ExecutiveCapability;
pub use market::MarketCapability;
pub use risk::RiskCapability;
pub use strategic::StrategicCapability;

use reasonchain_contracts::{
    analysis::ContentRecord,
    capability::CapabilityId,
    error::{ReasonchainError, ReasonchainResult},
};

fn require_content(id: &CapabilityId, content: &[ContentRecord]) -> ReasonchainResult<()> {
    if content.is_empty() {
        return Err(ReasonchainError::capability(id.as_str(), "no content to analyze"));
    }
    Ok(())
}
