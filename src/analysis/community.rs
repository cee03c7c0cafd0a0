//! Community-level metrics and typology.
//!
//! Consumes a partition of the finished graph and keeps every group with at least
//! `min_community_size` members. For each retained community it computes openness
//! (E-I index), latency, bottleneck density, workload skew and fragmentation impact,
//! then classifies it. The resulting table is ordered by fragmentation impact, most
//! critical first.

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;

use crate::algo::{GraphAlgorithms, Partition};
use crate::config::{AnalysisConfig, EiVariant};

use super::graph::{InteractionGraph, NodeIdx};
use super::ingest::IngestedCorpus;
use super::types::*;

/// Retained communities with their membership maps
#[derive(Debug, Clone, Default)]
pub struct CommunityAnalysis {
    /// Most critical community first
    pub table: Vec<CommunityMetrics>,
    /// Community id -> member addresses
    pub members: BTreeMap<String, Vec<String>>,
    /// Address -> community id, only for members of retained communities
    pub assignment: HashMap<String, String>,
    pub modularity: Option<f64>,
}

impl CommunityAnalysis {
    pub fn community_of(&self, address: &str) -> Option<&str> {
        self.assignment.get(address).map(|s| s.as_str())
    }
}

/// Internal/external edge tallies of a community
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeTally {
    pub internal_count: u64,
    pub external_count: u64,
    pub internal_weight: u64,
    pub external_weight: u64,
}

impl EdgeTally {
    /// Classify every outgoing edge of the members
    pub fn collect(graph: &InteractionGraph, members: &[NodeIdx]) -> Self {
        let member_set: HashSet<NodeIdx> = members.iter().copied().collect();
        let mut tally = Self::default();

        for &m in members {
            for (n, w) in graph.successors(m) {
                if member_set.contains(&n) {
                    tally.internal_count += 1;
                    tally.internal_weight += w;
                } else {
                    tally.external_count += 1;
                    tally.external_weight += w;
                }
            }
        }
        tally
    }

    pub fn ei_count(&self) -> f64 {
        ei_index(self.external_count, self.internal_count)
    }

    pub fn ei_weight(&self) -> f64 {
        ei_index(self.external_weight, self.internal_weight)
    }
}

/// (external - internal) / (external + internal), 0.0 when both are zero
pub fn ei_index(external: u64, internal: u64) -> f64 {
    let total = external + internal;
    if total == 0 {
        0.0
    } else {
        (external as f64 - internal as f64) / total as f64
    }
}

/// Percentage of members whose average response time exceeds the threshold
pub fn bottleneck_density(member_averages: &[Option<f64>], slow_threshold_hours: f64) -> f64 {
    if member_averages.is_empty() {
        return 0.0;
    }
    let slow = member_averages
        .iter()
        .filter(|avg| avg.is_some_and(|rt| rt > slow_threshold_hours))
        .count();
    slow as f64 / member_averages.len() as f64 * 100.0
}

/// Share of total load held by the top `fraction` of members (at least one)
pub fn workload_skew(loads: &[u64], fraction: f64) -> Option<f64> {
    let total: u64 = loads.iter().sum();
    if total == 0 {
        return None;
    }

    let mut sorted = loads.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let top_k = ((loads.len() as f64 * fraction) as usize).max(1);
    let top: u64 = sorted.iter().take(top_k).sum();
    Some(top as f64 / total as f64 * 100.0)
}

/// Percentage drop of the largest weakly connected component when `members` are removed
pub fn fragmentation_impact(
    graph: &InteractionGraph,
    members: &[NodeIdx],
    original_lcc: usize,
    algorithms: &dyn GraphAlgorithms,
) -> f64 {
    if graph.is_empty() || original_lcc == 0 {
        return 0.0;
    }
    let removed: HashSet<NodeIdx> = members.iter().copied().collect();
    let new_lcc = algorithms.largest_component(graph, &removed);
    (original_lcc as f64 - new_lcc as f64) / original_lcc as f64 * 100.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Classify on latency and openness rounded to two decimals, as they are reported
pub fn assign_typology(avg_response_hours: Option<f64>, ei_index: f64, config: &AnalysisConfig) -> Typology {
    Typology::classify(
        avg_response_hours.map(round2),
        Some(round2(ei_index)),
        config.slow_threshold_hours,
        config.openness_threshold,
    )
}

/// Member with the highest in-degree count; ties go to the smallest address
fn anchor_member<'a>(corpus: &IngestedCorpus, members: &'a [String]) -> Option<&'a String> {
    members.iter().min_by(|a, b| {
        corpus
            .in_degree(b)
            .cmp(&corpus.in_degree(a))
            .then_with(|| a.cmp(b))
    })
}

fn local_part(address: &str) -> &str {
    address.split('@').next().unwrap_or(address)
}

/// Metrics that do not need the graph-wide fragmentation pass
struct Candidate {
    metrics: CommunityMetrics,
    member_idx: Vec<NodeIdx>,
    members: Vec<String>,
}

fn evaluate_community(
    corpus: &IngestedCorpus,
    config: &AnalysisConfig,
    sequence: usize,
    group: &[NodeIdx],
) -> Option<Candidate> {
    let graph = &corpus.graph;
    let members: Vec<String> = group.iter().map(|&i| graph.address(i).to_string()).collect();
    let anchor = anchor_member(corpus, &members)?.clone();
    let id = format!("C{}_{}", sequence, local_part(&anchor));

    let tally = EdgeTally::collect(graph, group);
    let ei_count = tally.ei_count();
    let ei_weight = tally.ei_weight();
    let ei_index = match config.ei_for_typology {
        EiVariant::Count => ei_count,
        EiVariant::Weight => ei_weight,
    };

    let member_averages: Vec<Option<f64>> = members
        .iter()
        .map(|m| corpus.user_stats.get(m).and_then(|s| s.average_response_time()))
        .collect();
    let defined: Vec<f64> = member_averages.iter().flatten().copied().collect();
    let avg_response_hours = mean(&defined);

    let loads: Vec<u64> = members.iter().map(|m| corpus.in_degree(m)).collect();

    let metrics = CommunityMetrics {
        id,
        size: members.len(),
        anchor,
        avg_response_hours,
        bottleneck_density_pct: bottleneck_density(&member_averages, config.slow_threshold_hours),
        workload_skew_pct: workload_skew(&loads, config.workload_top_fraction),
        ei_count,
        ei_weight,
        ei_index,
        fragmentation_impact_pct: 0.0,
        typology: assign_typology(avg_response_hours, ei_index, config),
    };

    Some(Candidate {
        metrics,
        member_idx: group.to_vec(),
        members,
    })
}

/// Compute the community table from a partition of the finished graph
pub fn analyze_communities(
    corpus: &IngestedCorpus,
    partition: &Partition,
    config: &AnalysisConfig,
    algorithms: &dyn GraphAlgorithms,
) -> CommunityAnalysis {
    let graph = &corpus.graph;

    let candidates: Vec<Candidate> = partition
        .groups
        .iter()
        .enumerate()
        .filter(|(_, group)| group.len() >= config.min_community_size)
        .filter_map(|(i, group)| evaluate_community(corpus, config, i + 1, group))
        .collect();

    log::info!(
        "[Macro] {} of {} communities have at least {} members",
        candidates.len(),
        partition.groups.len(),
        config.min_community_size
    );

    let original_lcc = algorithms.largest_component(graph, &HashSet::new());

    let impacts: Vec<f64> = candidates
        .par_iter()
        .map(|c| fragmentation_impact(graph, &c.member_idx, original_lcc, algorithms))
        .collect();

    let mut analysis = CommunityAnalysis {
        modularity: partition.modularity,
        ..CommunityAnalysis::default()
    };

    for (mut candidate, impact) in candidates.into_iter().zip(impacts) {
        candidate.metrics.fragmentation_impact_pct = impact;
        log::debug!(
            "{}: size={} ei={:.2} frag={:.2}% typology={}",
            candidate.metrics.id,
            candidate.metrics.size,
            candidate.metrics.ei_index,
            impact,
            candidate.metrics.typology
        );

        for member in &candidate.members {
            analysis
                .assignment
                .insert(member.clone(), candidate.metrics.id.clone());
        }
        analysis
            .members
            .insert(candidate.metrics.id.clone(), candidate.members);
        analysis.table.push(candidate.metrics);
    }

    analysis.table.sort_by(|a, b| {
        b.fragmentation_impact_pct
            .partial_cmp(&a.fragmentation_impact_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    analysis
}
