//! Report generation for communication graph analysis.
//!
//! Generates both JSON and human-readable text reports.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::*;

/// Generate JSON report
pub fn generate_json_report(report: &FullAnalysisReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

/// Format the community table as aligned text rows
pub fn format_community_table(communities: &[CommunityMetrics], limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{:<24} {:>6} {:>10} {:>9} {:>8} {:>8} {:>8} {:>9}  {}",
        "Community", "Size", "AvgRT(h)", "Bneck%", "Skew%", "EI_cnt", "EI_wt", "Frag%", "Typology"
    ));
    for c in communities.iter().take(limit) {
        lines.push(format!(
            "{:<24} {:>6} {:>10} {:>9.1} {:>8} {:>8.2} {:>8.2} {:>9.2}  {}",
            c.id,
            c.size,
            fmt_opt(c.avg_response_hours, 2),
            c.bottleneck_density_pct,
            fmt_opt(c.workload_skew_pct, 1),
            c.ei_count,
            c.ei_weight,
            c.fragmentation_impact_pct,
            c.typology
        ));
    }
    lines
}

/// Format the robustness result
pub fn format_robustness(result: &RobustnessReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} (removing top {}, original LCC {})",
            result.community_id, result.removal_count, result.original_lcc
        ),
        format!(
            "  - Remove Load Absorbers: LCC Loss = {:.2}%  [{}]",
            result.loss_load_pct,
            result.load_absorbers.join(", ")
        ),
        format!(
            "  - Remove Connectors:     LCC Loss = {:.2}%  [{}]",
            result.loss_connector_pct,
            result.connectors.join(", ")
        ),
    ];
    if let Some(multiplier) = result.connector_impact_multiplier {
        lines.push(format!(
            "  => Connector impact is {:.1}x the volume impact",
            multiplier
        ));
    }
    lines
}

/// Format the behavior diagnostics
pub fn format_diagnostics(diagnostics: &BehaviorDiagnostics) -> Vec<String> {
    let mut lines = Vec::new();

    let silos = &diagnostics.silos;
    lines.push(format!(
        "Silos: {} disconnected group(s), largest {}",
        silos.component_count, silos.largest_component
    ));
    if let Some(second) = silos.second_largest_component {
        lines.push(format!("  second largest group: {}", second));
    }

    lines.push("Passive Leaders (many senders, few replies):".to_string());
    if diagnostics.passive_leaders.is_empty() {
        lines.push("  none".to_string());
    }
    for (i, leader) in diagnostics.passive_leaders.iter().enumerate() {
        lines.push(format!(
            "  {}. {} in={} out={} ratio={:.3}",
            i + 1,
            leader.user,
            leader.in_degree,
            leader.out_degree,
            leader.ratio
        ));
    }

    lines.push("After-Hours Senders:".to_string());
    if diagnostics.after_hours_senders.is_empty() {
        lines.push("  none".to_string());
    }
    for (i, sender) in diagnostics.after_hours_senders.iter().enumerate() {
        lines.push(format!(
            "  {}. {} {} of {} sent after hours",
            i + 1,
            sender.user,
            sender.after_hours_sent,
            sender.total_sent
        ));
    }

    lines
}

/// Generate human-readable text report
pub fn generate_text_report(report: &FullAnalysisReport, output_path: &Path) -> Result<()> {
    let mut lines: Vec<String> = Vec::new();

    // Header
    lines.push("=".repeat(80));
    lines.push("                 ORGANIZATIONAL COMMUNICATION GRAPH ANALYSIS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    // Metadata
    lines.push(format!("Analysis Date: {}", report.metadata.analysis_timestamp));
    lines.push(format!("Corpus: {}", report.metadata.corpus));
    lines.push(String::new());

    // Ingestion
    let ing = &report.ingestion;
    lines.push("Ingestion:".to_string());
    lines.push(format!("  Rows read: {}", ing.rows_read));
    lines.push(format!("  Messages kept: {}", ing.messages_kept));
    for (reason, count) in &ing.rejected {
        lines.push(format!("  Rejected ({}): {}", reason, count));
    }
    lines.push(format!("  Users: {}", ing.users));
    lines.push(format!("  Graph: {} nodes, {} edges", ing.nodes, ing.edges));
    lines.push(format!("  Largest component: {} nodes", ing.largest_component));
    lines.push(format!(
        "  Latency samples: {} recorded, {} outside bounds",
        ing.latency_samples, ing.discarded_samples
    ));
    lines.push(format!("  Modularity: {}", fmt_opt(report.modularity, 4)));
    lines.push(String::new());

    // Communities
    lines.push("=".repeat(80));
    lines.push("                           COMMUNITY TYPOLOGY".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    if report.communities.is_empty() {
        lines.push("No community reached the minimum size.".to_string());
    } else {
        lines.extend(format_community_table(&report.communities, report.communities.len()));
    }
    lines.push(String::new());

    // Most central individuals
    if !report.individuals.is_empty() {
        lines.push("Top Connectors (betweenness):".to_string());
        let mut ranked: Vec<&IndividualMetrics> = report.individuals.iter().collect();
        ranked.sort_by(|a, b| {
            b.betweenness
                .partial_cmp(&a.betweenness)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for (i, person) in ranked.iter().take(10).enumerate() {
            lines.push(format!(
                "  {}. {} [{}] betweenness={:.4} received={} external_out={:.1}%",
                i + 1,
                person.user,
                person.community,
                person.betweenness,
                person.received_count,
                person.external_out_pct
            ));
        }
        lines.push(String::new());
    }

    // Robustness
    if let Some(ref result) = report.robustness {
        lines.push("=".repeat(80));
        lines.push("                         ROBUSTNESS SIMULATION".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());
        lines.extend(format_robustness(result));
        lines.push(String::new());
    }

    // Behavior diagnostics
    lines.push("=".repeat(80));
    lines.push("                          BEHAVIOR DIAGNOSTICS".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());
    lines.extend(format_diagnostics(&report.diagnostics));
    lines.push(String::new());

    // Footer
    lines.push("=".repeat(80));

    let content = lines.join("\n");
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print a summary to stdout
pub fn print_summary(report: &FullAnalysisReport, top_n: usize) {
    println!("\n=== COMMUNICATION GRAPH ANALYSIS SUMMARY ===\n");
    println!(
        "Messages kept: {} of {} rows",
        report.ingestion.messages_kept, report.ingestion.rows_read
    );
    println!(
        "Graph: {} nodes, {} edges",
        report.ingestion.nodes, report.ingestion.edges
    );
    println!("Modularity: {}", fmt_opt(report.modularity, 4));

    if !report.communities.is_empty() {
        println!("\nTop communities by fragmentation impact:");
        for line in format_community_table(&report.communities, top_n) {
            println!("  {}", line);
        }
    }

    if let Some(ref result) = report.robustness {
        println!("\nRobustness Simulation:");
        for line in format_robustness(result) {
            println!("  {}", line);
        }
    }

    println!("\nBehavior Diagnostics:");
    for line in format_diagnostics(&report.diagnostics) {
        println!("  {}", line);
    }

    println!();
}
