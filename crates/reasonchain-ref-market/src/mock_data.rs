//! Simulated market intelligence for the reference capabilities.
//!
//! Everything here is hardcoded and fictional. The corpus stands in for a
//! news or research feed; the lexicons stand in for the models a production
//! deployment would call.

use reasonchain_contracts::analysis::ContentRecord;

// ── Corpus (mock) ─────────────────────────────────────────────────────────────

/// Six fictional articles about the workflow-software market.
pub fn sample_content() -> Vec<ContentRecord> {
    vec![
        ContentRecord::new(
            "industry-wire",
            "Northwind moves its whole catalogue to subscription pricing",
            "Northwind announced that every product will move to subscription pricing next \
             quarter. Analysts expect the shift to squeeze margin for smaller vendors already \
             offering steep discount programs.",
        ),
        ContentRecord::new(
            "market-weekly",
            "Workflow spend keeps growing despite budget cuts elsewhere",
            "Enterprise spend on workflow automation grew 14% year over year. Buyers report \
             expanding AI assistant pilots, although some mid-market firms cut discretionary \
             budgets.",
        ),
        ContentRecord::new(
            "regulatory-desk",
            "Regulators open inquiry into Globex bundled automation suites",
            "The competition authority opened an antitrust inquiry into bundled suites sold by \
             Globex. Compliance teams across the sector are reviewing contract terms, and \
             regulators signalled further compliance guidance.",
        ),
        ContentRecord::new(
            "analyst-note",
            "Initech courts mid-market buyers with guided onboarding",
            "Initech launched a guided onboarding program aimed at the mid-market, a segment \
             analysts say incumbents underserve. Northwind and Globex have no comparable offer.",
        ),
        ContentRecord::new(
            "supply-report",
            "Chip shortage delays on-premise appliance shipments",
            "A component shortage is causing delivery delay for on-premise appliances. Vendors \
             with cloud-only offerings, including Globex, are expected to expand share.",
        ),
        ContentRecord::new(
            "earnings-digest",
            "Consolidation talk grows after Umbrella Analytics acquisition",
            "Umbrella Analytics completed its acquisition of a process-mining startup. Bankers \
             expect further merger activity as growth in AI automation attracts investment.",
        ),
    ]
}

// ── Lexicons (mock) ───────────────────────────────────────────────────────────

/// A labelled finding and the lowercase keywords that count as evidence.
pub struct Signal {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

pub const TRENDS: &[Signal] = &[
    Signal { label: "subscription pricing", keywords: &["subscription"] },
    Signal { label: "AI-assisted automation", keywords: &["ai ", "automation"] },
    Signal { label: "vendor consolidation", keywords: &["acquisition", "merger", "consolidation"] },
    Signal { label: "cloud-first delivery", keywords: &["cloud"] },
];

pub const STRATEGIC_MOVES: &[Signal] = &[
    Signal { label: "bundle AI features into the core subscription", keywords: &["subscription", "ai "] },
    Signal { label: "pursue targeted acquisitions in process mining", keywords: &["acquisition", "merger"] },
    Signal { label: "shift appliance customers to cloud delivery", keywords: &["cloud", "on-premise"] },
];

pub const COMPETITORS: &[&str] = &["Northwind", "Globex", "Initech", "Umbrella Analytics"];

pub const MARKET_GAPS: &[Signal] = &[
    Signal { label: "guided mid-market onboarding", keywords: &["mid-market", "onboarding"] },
    Signal { label: "unbundled compliance-friendly contracts", keywords: &["bundled", "contract"] },
    Signal { label: "reliable on-premise supply", keywords: &["on-premise", "shortage"] },
];

/// Risks carry a fixed severity: `high`, `medium` or `low`.
pub const RISKS: &[(Signal, &str)] = &[
    (Signal { label: "regulatory scrutiny", keywords: &["regulat", "antitrust", "compliance"] }, "high"),
    (Signal { label: "supply disruption", keywords: &["shortage", "delay"] }, "medium"),
    (Signal { label: "pricing pressure", keywords: &["discount", "margin", "price war"] }, "medium"),
    (Signal { label: "talent attrition", keywords: &["attrition", "layoff"] }, "low"),
];

/// Market movements with their direction, `up` or `down`.
pub const MOVEMENTS: &[(Signal, &str)] = &[
    (Signal { label: "rising automation spend", keywords: &["grew", "growth", "expand"] }, "up"),
    (Signal { label: "consolidation wave", keywords: &["acquisition", "merger"] }, "up"),
    (Signal { label: "discretionary budget cuts", keywords: &["cut", "slowdown", "decline"] }, "down"),
];

// ── Matching ──────────────────────────────────────────────────────────────────

fn corpus(content: &[ContentRecord]) -> String {
    content
        .iter()
        .map(|r| format!("{} {}", r.title, r.text))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Total keyword occurrences of `terms` across titles and texts.
pub fn count_terms(content: &[ContentRecord], terms: &[&str]) -> usize {
    let text = corpus(content);
    terms
        .iter()
        .map(|t| text.matches(&t.to_lowercase()).count())
        .sum()
}

/// `(index, hits)` for every signal with evidence, strongest first. Ties
/// keep lexicon order.
pub fn rank_signals<'a, I>(content: &[ContentRecord], signals: I) -> Vec<(usize, usize)>
where
    I: IntoIterator<Item = &'a Signal>,
{
    let mut ranked: Vec<(usize, usize)> = signals
        .into_iter()
        .enumerate()
        .map(|(i, s)| (i, count_terms(content, s.keywords)))
        .filter(|(_, hits)| *hits > 0)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

/// Confidence grows with evidence: 0.5 with a single hit, up to 0.9.
pub fn evidence_confidence(hits: usize) -> f64 {
    (0.45 + 0.05 * hits as f64).min(0.9)
}
