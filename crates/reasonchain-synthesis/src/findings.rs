//! Field extraction from capability payloads.
//!
//! Each accessor reads one well-known payload field of one capability and
//! substitutes a generic placeholder when the capability did not run or the
//! field is absent. Synthesis never fails on a missing field.
//!
//! | accessor             | capability  | payload path                  |
//! |----------------------|-------------|-------------------------------|
//! | `top_trend`          | strategic   | `key_trends.0`                |
//! | `strategic_move`     | strategic   | `strategic_recommendations.0` |
//! | `top_competitor`     | competitive | `competitors.0.name`          |
//! | `market_gap`         | competitive | `market_gaps.0`               |
//! | `top_risk`           | risk        | `risks.0.name`                |
//! | `risk_level`         | risk        | `overall_risk_level`          |
//! | `top_prediction`     | market      | `predictions.0.trend`         |
//! | `market_outlook`     | market      | `market_outlook`              |
//! | `executive_priority` | executive   | `key_recommendations.0`       |

use std::collections::BTreeMap;

use reasonchain_contracts::{analysis::AnalysisReport, capability::known};

pub(crate) struct Findings<'a> {
    reports: &'a BTreeMap<&'a str, &'a AnalysisReport>,
}

impl<'a> Findings<'a> {
    pub(crate) fn new(reports: &'a BTreeMap<&'a str, &'a AnalysisReport>) -> Self {
        Self { reports }
    }

    fn read(&self, capability: &str, path: &str, placeholder: &str) -> String {
        self.reports
            .get(capability)
            .and_then(|report| report.text(path))
            .unwrap_or(placeholder)
            .to_string()
    }

    pub(crate) fn top_trend(&self) -> String {
        self.read(known::STRATEGIC, "key_trends.0", "an emerging trend")
    }

    pub(crate) fn strategic_move(&self) -> String {
        self.read(
            known::STRATEGIC,
            "strategic_recommendations.0",
            "the current strategic course",
        )
    }

    pub(crate) fn top_competitor(&self) -> String {
        self.read(known::COMPETITIVE, "competitors.0.name", "the leading competitor")
    }

    pub(crate) fn market_gap(&self) -> String {
        self.read(known::COMPETITIVE, "market_gaps.0", "an unaddressed market gap")
    }

    pub(crate) fn top_risk(&self) -> String {
        self.read(known::RISK, "risks.0.name", "an unquantified risk")
    }

    pub(crate) fn risk_level(&self) -> String {
        self.read(known::RISK, "overall_risk_level", "undetermined")
    }

    pub(crate) fn top_prediction(&self) -> String {
        self.read(known::MARKET, "predictions.0.trend", "a pending market shift")
    }

    pub(crate) fn market_outlook(&self) -> String {
        self.read(known::MARKET, "market_outlook", "uncertain")
    }

    pub(crate) fn executive_priority(&self) -> String {
        self.read(
            known::EXECUTIVE,
            "key_recommendations.0",
            "consolidate the findings before committing resources",
        )
    }
}
