//! Graph algorithms consumed by the analysis engine.
//!
//! The engine only relies on the result contracts of these algorithms, expressed by the
//! [`GraphAlgorithms`] trait: a node partition, component sizes and per-node betweenness
//! scores keyed by address. [`BuiltinAlgorithms`] backs the trait with the
//! implementations in this module; tests and callers may supply their own.

pub mod betweenness;
pub mod components;
pub mod modularity;

use std::collections::{HashMap, HashSet};

use crate::analysis::graph::{InteractionGraph, NodeIdx};

pub use components::{largest_component_size, weakly_connected_components};
pub use modularity::{louvain_partition, Partition};

/// Betweenness scores keyed by address
pub type CentralityScores = HashMap<String, f64>;

/// Graph primitives the analysis depends on
pub trait GraphAlgorithms: Sync {
    /// Partition all nodes into communities
    fn partition(&self, graph: &InteractionGraph) -> Partition;

    /// Size of the largest weakly connected component once `removed` is taken out
    fn largest_component(&self, graph: &InteractionGraph, removed: &HashSet<NodeIdx>) -> usize;

    /// Sizes of all weakly connected components, largest first
    fn component_sizes(&self, graph: &InteractionGraph) -> Vec<usize>;

    /// Betweenness for every node, exact or over a sample of sources
    fn betweenness(&self, graph: &InteractionGraph, sample_size: Option<usize>) -> CentralityScores;

    /// Betweenness counting only paths from `sources` to `targets`
    fn subset_betweenness(
        &self,
        graph: &InteractionGraph,
        sources: &[NodeIdx],
        targets: &[NodeIdx],
    ) -> CentralityScores;
}

/// Default in-crate implementations
#[derive(Debug, Clone, Default)]
pub struct BuiltinAlgorithms {
    /// Seed for sampled betweenness
    pub seed: u64,
}

impl BuiltinAlgorithms {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

fn keyed_by_address(graph: &InteractionGraph, scores: Vec<f64>) -> CentralityScores {
    scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| (graph.address(idx).to_string(), score))
        .collect()
}

impl GraphAlgorithms for BuiltinAlgorithms {
    fn partition(&self, graph: &InteractionGraph) -> Partition {
        louvain_partition(graph)
    }

    fn largest_component(&self, graph: &InteractionGraph, removed: &HashSet<NodeIdx>) -> usize {
        largest_component_size(graph, removed)
    }

    fn component_sizes(&self, graph: &InteractionGraph) -> Vec<usize> {
        weakly_connected_components(graph, &HashSet::new())
            .iter()
            .map(|c| c.len())
            .collect()
    }

    fn betweenness(&self, graph: &InteractionGraph, sample_size: Option<usize>) -> CentralityScores {
        let scores = betweenness::betweenness_centrality(graph, sample_size, self.seed);
        keyed_by_address(graph, scores)
    }

    fn subset_betweenness(
        &self,
        graph: &InteractionGraph,
        sources: &[NodeIdx],
        targets: &[NodeIdx],
    ) -> CentralityScores {
        let scores = betweenness::subset_betweenness(graph, sources, targets);
        keyed_by_address(graph, scores)
    }
}
