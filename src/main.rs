//! Communication graph analysis CLI.
//!
//! Reads an email corpus, builds the directed interaction graph and reports
//! community typology, individual metrics and a robustness drill-down.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};

use commgraph::algo::BuiltinAlgorithms;
use commgraph::analysis::{self, PipelineOptions};
use commgraph::config_loader::{self, CliOverrides};
use commgraph::corpus;

#[derive(Parser, Debug)]
#[command(name = "commgraph")]
#[command(about = "Organizational communication graph analysis over email corpora")]
#[command(version)]
struct Cli {
    /// Path to the CSV email corpus
    #[arg(short, long)]
    input: PathBuf,

    /// Optional YAML analysis configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, default_value = "analysis_output")]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,

    /// Maximum number of corpus rows to read (0 = no limit)
    #[arg(long)]
    limit: Option<usize>,

    /// Community id to drill into instead of the most critical one
    #[arg(long)]
    community: Option<String>,

    /// Number of members removed in the robustness simulation
    #[arg(long)]
    top_k: Option<usize>,

    /// Sort messages by timestamp before reply matching
    #[arg(long)]
    sort_by_timestamp: bool,

    /// Compute exact betweenness instead of sampling sources
    #[arg(long)]
    exact_betweenness: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            record_limit: self.limit,
            removal_count: self.top_k,
            sort_by_timestamp: self.sort_by_timestamp,
            exact_betweenness: self.exact_betweenness,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let mut config = config_loader::load_or_default(cli.config.as_deref())?;
    config_loader::apply_overrides(&mut config, &cli.overrides())?;

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    log::info!("Loading corpus from {}...", cli.input.display());
    let loaded = corpus::load_corpus(&cli.input, &config)?;

    let algorithms = BuiltinAlgorithms::new(config.betweenness_seed);
    let options = PipelineOptions {
        corpus_label: cli.input.display().to_string(),
        target_community: cli.community.clone(),
    };
    let report = analysis::run_pipeline(
        &loaded.messages,
        &loaded.stats,
        &config,
        &algorithms,
        &options,
    )?;

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    analysis::generate_json_report(&report, &cli.output.join("full_report.json"))?;
    analysis::generate_text_report(&report, &cli.output.join("report.txt"))?;

    analysis::print_summary(&report, config.top_n);

    log::info!("Analysis complete. Reports written to {}", cli.output.display());

    Ok(())
}
