//! # Commgraph - Organizational communication graph analytics
//!
//! This library turns an email corpus into a directed, weighted interaction
//! graph and derives diagnostics about how an organization communicates.
//!
//! ## Overview
//!
//! Messages are filtered for quality, then folded into a graph where an edge
//! `a -> b` counts the messages `a` sent to `b`. While the graph is built,
//! reply latencies are measured by pairing each message with the earliest
//! unanswered message in the opposite direction of the same thread.
//!
//! ## Key Features
//!
//! - **Community typology**: Black Hole, Overloaded Hub, Bureaucratic or Agile Connector,
//!   from reply latency and the E-I openness index
//! - **Fragmentation criticality**: how much the largest connected component
//!   shrinks when a community disappears
//! - **Workload skew and bottleneck density** per community
//! - **Robustness drill-down**: removing load absorbers versus connectors
//! - **Behavior diagnostics**: after-hours senders, passive leaders and silos
//!
//! ## Architecture
//!
//! - `config`: Analysis parameters and validation
//! - `config_loader`: YAML loading and CLI overrides
//! - `corpus`: CSV reading, header extraction and record filtering
//! - `analysis`: Graph building, latency matching, metrics and reports
//! - `algo`: Components, modularity partition and betweenness behind a trait
//! - `utils`: Subject normalization and date parsing
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use commgraph::{algo::BuiltinAlgorithms, analysis, config::AnalysisConfig, corpus};
//!
//! let config = AnalysisConfig::default();
//! let loaded = corpus::load_corpus(Path::new("emails.csv"), &config)?;
//! let algorithms = BuiltinAlgorithms::new(config.betweenness_seed);
//! let report = analysis::run_pipeline(
//!     &loaded.messages,
//!     &loaded.stats,
//!     &config,
//!     &algorithms,
//!     &analysis::PipelineOptions::default(),
//! )?;
//! analysis::print_summary(&report, config.top_n);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Input-source failures are reported through `color_eyre` with context.
//! Malformed individual records are counted and skipped, never raised.

pub mod config;
pub mod config_loader;
pub mod corpus;
pub mod analysis;
pub mod algo;
pub mod utils;
