//! Reasoning Chain Orchestrator: Demo CLI
//!
//! Drives the orchestrator facade over the market reference capabilities and
//! the mock news corpus.
//!
//! Usage:
//!   cargo run -p demo -- analyze --depth deep --topic pricing
//!   cargo run -p demo -- analyze --depth standard --topology parallel --capability risk --capability market
//!   cargo run -p demo -- analyze --depth ultra --content articles.json --config reasonchain.toml
//!   cargo run -p demo -- showcase

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use reasonchain_config::OrchestratorConfig;
use reasonchain_contracts::{
    analysis::ContentRecord,
    capability::CapabilityId,
    chain::{AnalysisDepth, Topology},
    error::{ReasonchainError, ReasonchainResult},
};
use reasonchain_progress::InMemoryProgressRecorder;
use reasonchain_ref_market::{default_registry, mock_data::sample_content};
use reasonchain_runtime::{OrchestrationRequest, Orchestrator};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Reasoning chain orchestrator demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Reasoning chain orchestrator demo",
    long_about = "Designs, executes and synthesizes multi-capability reasoning chains\n\
                  over a mock market-intelligence corpus."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one orchestration and print the result as JSON.
    Analyze {
        /// rapid, standard, deep or ultra.
        #[arg(long, default_value = "standard", value_parser = parse_depth)]
        depth: AnalysisDepth,
        /// Override the depth's default topology.
        #[arg(long, value_parser = parse_topology)]
        topology: Option<Topology>,
        /// Run these capabilities instead of the depth's default set.
        #[arg(long = "capability")]
        capabilities: Vec<String>,
        #[arg(long = "topic")]
        topics: Vec<String>,
        /// JSON array of content records. Defaults to the mock corpus.
        #[arg(long)]
        content: Option<PathBuf>,
        /// TOML orchestrator configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run every topology over the mock corpus and verify the progress log.
    Showcase,
}

fn parse_depth(s: &str) -> Result<AnalysisDepth, String> {
    s.parse().map_err(|e: ReasonchainError| e.to_string())
}

fn parse_topology(s: &str) -> Result<Topology, String> {
    s.parse().map_err(|e: ReasonchainError| e.to_string())
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for step-level output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Analyze {
            depth,
            topology,
            capabilities,
            topics,
            content,
            config,
        } => run_analyze(depth, topology, capabilities, topics, content, config).await,
        Command::Showcase => run_showcase().await,
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── analyze ───────────────────────────────────────────────────────────────────

async fn run_analyze(
    depth: AnalysisDepth,
    topology: Option<Topology>,
    capabilities: Vec<String>,
    topics: Vec<String>,
    content: Option<PathBuf>,
    config: Option<PathBuf>,
) -> ReasonchainResult<()> {
    let config = match config {
        Some(path) => OrchestratorConfig::from_file(&path)?,
        None => OrchestratorConfig::default(),
    };
    let content = match content {
        Some(path) => load_content(&path)?,
        None => sample_content(),
    };

    let mut request = OrchestrationRequest::new(depth, content, topics);
    if let Some(topology) = topology {
        request = request.with_topology(topology);
    }
    if !capabilities.is_empty() {
        request = request.with_capabilities(capabilities.into_iter().map(CapabilityId::new).collect());
    }

    let orchestrator = Orchestrator::new(Arc::new(default_registry())).with_config(config);
    let result = orchestrator.orchestrate(request).await?;

    let rendered = serde_json::to_string_pretty(&result).map_err(|e| ReasonchainError::Orchestration {
        reason: format!("failed to render result: {}", e),
    })?;
    println!("{}", rendered);
    Ok(())
}

fn load_content(path: &Path) -> ReasonchainResult<Vec<ContentRecord>> {
    let raw = std::fs::read_to_string(path).map_err(|e| ReasonchainError::Config {
        reason: format!("failed to read content file '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&raw).map_err(|e| ReasonchainError::Config {
        reason: format!("content file '{}' is not a JSON array of records: {}", path.display(), e),
    })
}

// ── showcase ──────────────────────────────────────────────────────────────────

async fn run_showcase() -> ReasonchainResult<()> {
    print_banner();

    let recorder = Arc::new(InMemoryProgressRecorder::new("showcase"));
    let orchestrator =
        Orchestrator::new(Arc::new(default_registry())).with_progress(recorder.clone());
    let topics = vec!["pricing".to_string(), "consolidation".to_string()];

    for topology in Topology::ALL {
        let request = OrchestrationRequest::new(AnalysisDepth::Ultra, sample_content(), topics.clone())
            .with_topology(topology);
        let result = orchestrator.orchestrate(request).await?;

        let completed: usize = result.chains.iter().map(|c| c.completed_count()).sum();
        let total: usize = result.chains.iter().map(|c| c.steps.len()).sum();
        println!(
            "  {:<12} steps {}/{}  pattern {:<22} confidence {:.2}",
            topology.as_str(),
            completed,
            total,
            result.synthesis.pattern.as_str(),
            result.confidence
        );
        if let Some(first) = result.recommendations.first() {
            println!("  {:<12} → {}", "", first);
        }
    }

    let log = recorder.export_log();
    info!(entries = log.entries.len(), "showcase finished");
    println!();
    println!("Progress log: {} entries", log.entries.len());
    println!("Terminal hash: {}", log.terminal_hash);
    println!(
        "Integrity: {}",
        if recorder.verify_integrity() { "verified" } else { "BROKEN" }
    );
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Reasoning Chain Orchestrator");
    println!("Market Intelligence Showcase");
    println!("============================");
    println!();
    println!("Per run:");
    println!("  [1] Design: depth template + topology → steps, dependencies, batches");
    println!("  [2] Execute: batches in order; parallel/hierarchical batches fan out");
    println!("  [3] Synthesize: pattern chosen from the capabilities that succeeded");
    println!("  [4] Recommend: top insight, coordination, high-confidence sources, close");
    println!();
}
