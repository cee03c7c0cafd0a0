//! Network robustness simulation.
//!
//! Compares how much the largest weakly connected component shrinks when a community
//! loses its top load absorbers (highest in-degree count) versus its top connectors
//! (highest betweenness over paths starting inside the community). Removals never touch
//! the shared graph.

use std::collections::{HashMap, HashSet};

use crate::algo::GraphAlgorithms;

use super::graph::NodeIdx;
use super::ingest::IngestedCorpus;
use super::types::RobustnessReport;

/// Pick the top `k` members by score, ties broken by address
fn top_by<F>(members: &[(NodeIdx, &str)], k: usize, score: F) -> Vec<(NodeIdx, String)>
where
    F: Fn(NodeIdx, &str) -> f64,
{
    let mut ranked: Vec<(NodeIdx, &str, f64)> = members
        .iter()
        .map(|&(idx, addr)| (idx, addr, score(idx, addr)))
        .collect();
    ranked.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });
    ranked
        .into_iter()
        .take(k)
        .map(|(idx, addr, _)| (idx, addr.to_string()))
        .collect()
}

fn loss_pct(original: usize, after: usize) -> f64 {
    if original == 0 {
        0.0
    } else {
        (original as f64 - after as f64) / original as f64 * 100.0
    }
}

/// Run the load-vs-connector removal experiment for one community
pub fn simulate_removal(
    corpus: &IngestedCorpus,
    community_id: &str,
    members: &[String],
    removal_count: usize,
    algorithms: &dyn GraphAlgorithms,
) -> RobustnessReport {
    let graph = &corpus.graph;

    let resolved: Vec<(NodeIdx, &str)> = members
        .iter()
        .filter_map(|m| match graph.index_of(m) {
            Some(idx) => Some((idx, m.as_str())),
            None => {
                log::warn!("{} is not in the graph, skipping", m);
                None
            }
        })
        .collect();

    let original_lcc = algorithms.largest_component(graph, &HashSet::new());

    let load_absorbers = top_by(&resolved, removal_count, |_, addr| corpus.in_degree(addr) as f64);
    let removed: HashSet<NodeIdx> = load_absorbers.iter().map(|(idx, _)| *idx).collect();
    let lcc_after_load = algorithms.largest_component(graph, &removed);

    let sources: Vec<NodeIdx> = resolved.iter().map(|(idx, _)| *idx).collect();
    let targets: Vec<NodeIdx> = (0..graph.node_count()).collect();
    let subset_scores: HashMap<String, f64> = algorithms.subset_betweenness(graph, &sources, &targets);

    let connectors = top_by(&resolved, removal_count, |_, addr| {
        subset_scores.get(addr).copied().unwrap_or(0.0)
    });
    let removed: HashSet<NodeIdx> = connectors.iter().map(|(idx, _)| *idx).collect();
    let lcc_after_connectors = algorithms.largest_component(graph, &removed);

    let loss_load_pct = loss_pct(original_lcc, lcc_after_load);
    let loss_connector_pct = loss_pct(original_lcc, lcc_after_connectors);
    let connector_impact_multiplier = if loss_load_pct > 0.0 {
        Some(loss_connector_pct / loss_load_pct)
    } else {
        None
    };

    log::info!(
        "[Robustness] {} (removing top {}): load loss {:.2}%, connector loss {:.2}%",
        community_id,
        removal_count,
        loss_load_pct,
        loss_connector_pct
    );

    RobustnessReport {
        community_id: community_id.to_string(),
        removal_count,
        original_lcc,
        load_absorbers: load_absorbers.into_iter().map(|(_, a)| a).collect(),
        lcc_after_load_removal: lcc_after_load,
        loss_load_pct,
        connectors: connectors.into_iter().map(|(_, a)| a).collect(),
        lcc_after_connector_removal: lcc_after_connectors,
        loss_connector_pct,
        connector_impact_multiplier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::BuiltinAlgorithms;
    use crate::analysis::graph::InteractionGraph;

    /// `hub` receives most mail but is a leaf; `bridge` is the only link to the outside.
    fn corpus() -> IngestedCorpus {
        let mut graph = InteractionGraph::new();
        let mut corpus = IngestedCorpus::default();
        let mut send = |from: &str, to: &str, corpus: &mut IngestedCorpus| {
            graph.add_interaction(from, to);
            corpus.user_stats.entry(to.to_string()).or_default().in_degree_count += 1;
        };

        for _ in 0..5 {
            send("m1", "hub", &mut corpus);
            send("m2", "hub", &mut corpus);
        }
        send("m1", "bridge", &mut corpus);
        send("m2", "bridge", &mut corpus);
        send("bridge", "o1", &mut corpus);
        send("o1", "o2", &mut corpus);
        send("o2", "o3", &mut corpus);

        corpus.graph = graph;
        corpus
    }

    fn members() -> Vec<String> {
        ["m1", "m2", "hub", "bridge"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_connectors_beat_load_absorbers() {
        let corpus = corpus();
        let algorithms = BuiltinAlgorithms::default();
        let report = simulate_removal(&corpus, "C1_hub", &members(), 1, &algorithms);

        assert_eq!(report.original_lcc, 7);
        assert_eq!(report.load_absorbers, vec!["hub"]);
        assert_eq!(report.lcc_after_load_removal, 6);
        assert_eq!(report.connectors, vec!["bridge"]);
        assert_eq!(report.lcc_after_connector_removal, 3);

        let multiplier = report.connector_impact_multiplier.unwrap();
        assert!((multiplier - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_load_loss_gives_no_multiplier() {
        let mut graph = InteractionGraph::new();
        graph.add_interaction("a", "b");
        graph.add_interaction("b", "a");
        let corpus = IngestedCorpus {
            graph,
            ..IngestedCorpus::default()
        };
        let algorithms = BuiltinAlgorithms::default();

        let report = simulate_removal(&corpus, "C1_a", &["ghost".to_string()], 3, &algorithms);
        assert!(report.load_absorbers.is_empty());
        assert_eq!(report.loss_load_pct, 0.0);
        assert!(report.connector_impact_multiplier.is_none());
    }
}
