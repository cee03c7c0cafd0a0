//! Communication graph analysis.
//!
//! This module turns validated messages into an interaction graph and derives
//! community diagnostics: reply latency, openness, workload concentration,
//! fragmentation criticality, typology and a removal-robustness experiment. Graph-wide
//! behavior checks (after-hours mail, passive leaders, silos) run alongside.

pub mod types;
pub mod graph;
pub mod latency;
pub mod ingest;
pub mod community;
pub mod individual;
pub mod robustness;
pub mod diagnostics;
pub mod report;

use std::collections::HashSet;

use color_eyre::eyre::{eyre, Result};

use crate::algo::GraphAlgorithms;
use crate::config::AnalysisConfig;
use crate::corpus::{FilterStats, ValidatedMessage};

pub use types::*;
pub use graph::{InteractionGraph, NodeIdx};
pub use ingest::{ingest_messages, IngestContext, IngestedCorpus};
pub use community::{analyze_communities, CommunityAnalysis};
pub use individual::{attach_betweenness, build_individual_table};
pub use robustness::simulate_removal;
pub use diagnostics::diagnose;
pub use report::{generate_json_report, generate_text_report, print_summary};

/// Per-run options that are not part of the analysis configuration
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Label of the corpus recorded in the report metadata
    pub corpus_label: String,
    /// Community to drill into; defaults to the most critical one
    pub target_community: Option<String>,
}

/// Run every analysis stage over an already filtered corpus
pub fn run_pipeline(
    messages: &[ValidatedMessage],
    filter_stats: &FilterStats,
    config: &AnalysisConfig,
    algorithms: &dyn GraphAlgorithms,
    options: &PipelineOptions,
) -> Result<FullAnalysisReport> {
    log::info!("Ingesting {} validated messages...", messages.len());
    let corpus = ingest_messages(messages, config);

    log::info!("Detecting communities...");
    let partition = algorithms.partition(&corpus.graph);
    match partition.modularity {
        Some(q) => log::info!("[Macro] modularity={:.4}", q),
        None => log::warn!("[Macro] graph has no edges, modularity undefined"),
    }

    let communities = analyze_communities(&corpus, &partition, config, algorithms);

    log::info!("Building individual metrics...");
    let mut individuals = build_individual_table(&corpus, &communities);
    let scores = algorithms.betweenness(&corpus.graph, config.betweenness_sample_size);
    attach_betweenness(&mut individuals, &scores);

    let target = match &options.target_community {
        Some(id) => Some(
            communities
                .members
                .get_key_value(id)
                .ok_or_else(|| eyre!("Unknown community '{}'", id))?,
        ),
        None => communities
            .table
            .first()
            .and_then(|top| communities.members.get_key_value(&top.id)),
    };

    let robustness = match target {
        Some((id, members)) => {
            log::info!("Drill-down target: {}", id);
            Some(simulate_removal(&corpus, id, members, config.removal_count, algorithms))
        }
        None => {
            log::warn!("No community retained, skipping robustness simulation");
            None
        }
    };

    let diagnostics = diagnose(&corpus, config, algorithms);

    let ingestion = IngestSummary {
        rows_read: filter_stats.rows_read,
        messages_kept: filter_stats.kept,
        rejected: filter_stats.rejected.clone(),
        users: corpus.user_stats.len(),
        nodes: corpus.graph.node_count(),
        edges: corpus.graph.edge_count(),
        latency_samples: corpus.latency_samples,
        discarded_samples: corpus.discarded_samples,
        largest_component: algorithms.largest_component(&corpus.graph, &HashSet::new()),
    };

    Ok(FullAnalysisReport {
        metadata: AnalysisMetadata {
            analysis_timestamp: chrono::Utc::now().to_rfc3339(),
            corpus: options.corpus_label.clone(),
            config: config.clone(),
        },
        ingestion,
        modularity: communities.modularity,
        communities: communities.table,
        individuals,
        robustness,
        diagnostics,
    })
}
