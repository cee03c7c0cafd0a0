//! Modularity-maximizing partition (Louvain method).
//!
//! Works on the undirected, unweighted projection of the interaction graph: `u` and `v`
//! are linked when a message went either way. Each level greedily moves nodes to the
//! neighbouring community with the best modularity gain, then collapses communities
//! into super-nodes, until a level makes no move.

use std::collections::HashSet;

use crate::analysis::graph::{InteractionGraph, NodeIdx};

/// Passes over the nodes per level before giving up on convergence
const MAX_PASSES: usize = 100;

/// Minimum gain that counts as an improvement
const GAIN_EPSILON: f64 = 1e-12;

/// A partition of the graph's nodes
#[derive(Debug, Clone, Default)]
pub struct Partition {
    /// Groups ordered by size descending, ties by smallest member; members ascending
    pub groups: Vec<Vec<NodeIdx>>,
    /// Modularity of the partition on the undirected projection
    pub modularity: Option<f64>,
}

/// Weighted undirected graph used between Louvain levels
struct Level {
    /// Neighbours with link weight; no self-loops
    adjacency: Vec<Vec<(usize, f64)>>,
    /// Degree including internal links of collapsed nodes
    degree: Vec<f64>,
}

impl Level {
    fn from_graph(graph: &InteractionGraph) -> Self {
        let adjacency: Vec<Vec<(usize, f64)>> = (0..graph.node_count())
            .map(|idx| {
                graph
                    .undirected_neighbors(idx)
                    .into_iter()
                    .map(|v| (v, 1.0))
                    .collect()
            })
            .collect();
        let degree = adjacency.iter().map(|n| n.len() as f64).collect();
        Self { adjacency, degree }
    }

    fn len(&self) -> usize {
        self.degree.len()
    }

    /// One round of local moving. Returns the community of each node, renumbered densely.
    fn local_moving(&self, two_m: f64) -> (Vec<usize>, bool) {
        let n = self.len();
        let mut community: Vec<usize> = (0..n).collect();
        let mut total: Vec<f64> = self.degree.clone();
        let mut moved_any = false;

        // Scratch space reused across nodes
        let mut link_weight = vec![0.0; n];
        let mut touched: Vec<usize> = Vec::new();

        for _ in 0..MAX_PASSES {
            let mut moved = false;

            for node in 0..n {
                let current = community[node];
                let k_i = self.degree[node];

                for &(neighbor, w) in &self.adjacency[node] {
                    let c = community[neighbor];
                    if link_weight[c] == 0.0 {
                        touched.push(c);
                    }
                    link_weight[c] += w;
                }

                total[current] -= k_i;

                let mut best = current;
                let mut best_gain = link_weight[current] - total[current] * k_i / two_m;
                for &c in &touched {
                    let gain = link_weight[c] - total[c] * k_i / two_m;
                    if gain > best_gain + GAIN_EPSILON {
                        best = c;
                        best_gain = gain;
                    }
                }

                total[best] += k_i;
                if best != current {
                    community[node] = best;
                    moved = true;
                    moved_any = true;
                }

                for &c in &touched {
                    link_weight[c] = 0.0;
                }
                touched.clear();
            }

            if !moved {
                break;
            }
        }

        (renumber(&community), moved_any)
    }

    /// Collapse communities into super-nodes
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut degree = vec![0.0; count];
        let mut links: Vec<std::collections::BTreeMap<usize, f64>> = vec![Default::default(); count];

        for node in 0..self.len() {
            let c = community[node];
            degree[c] += self.degree[node];
            for &(neighbor, w) in &self.adjacency[node] {
                let d = community[neighbor];
                if c != d {
                    *links[c].entry(d).or_insert(0.0) += w;
                }
            }
        }

        let adjacency = links.into_iter().map(|m| m.into_iter().collect()).collect();
        Self { adjacency, degree }
    }
}

/// Map arbitrary labels to 0..k in order of first appearance
fn renumber(labels: &[usize]) -> Vec<usize> {
    let mut mapping = vec![usize::MAX; labels.len()];
    let mut next = 0;
    labels
        .iter()
        .map(|&label| {
            if mapping[label] == usize::MAX {
                mapping[label] = next;
                next += 1;
            }
            mapping[label]
        })
        .collect()
}

/// Partition the graph by maximizing modularity
pub fn louvain_partition(graph: &InteractionGraph) -> Partition {
    let n = graph.node_count();
    if n == 0 {
        return Partition::default();
    }

    let mut level = Level::from_graph(graph);
    let two_m: f64 = level.degree.iter().sum();

    // Community of every original node
    let mut assignment: Vec<usize> = (0..n).collect();

    if two_m > 0.0 {
        loop {
            let (community, moved) = level.local_moving(two_m);
            if !moved {
                break;
            }
            let count = community.iter().max().map(|&c| c + 1).unwrap_or(0);
            for a in assignment.iter_mut() {
                *a = community[*a];
            }
            // Moves that only permuted labels leave nothing to collapse
            if count == level.len() {
                break;
            }
            level = level.aggregate(&community, count);
        }
    }

    let count = assignment.iter().max().map(|&c| c + 1).unwrap_or(0);
    let mut groups: Vec<Vec<NodeIdx>> = vec![Vec::new(); count];
    for (node, &c) in assignment.iter().enumerate() {
        groups[c].push(node);
    }
    groups.retain(|g| !g.is_empty());
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let modularity = modularity(graph, &groups);
    Partition { groups, modularity }
}

/// Modularity of a partition on the undirected, unweighted projection.
///
/// Returns `None` for a graph without edges.
pub fn modularity(graph: &InteractionGraph, groups: &[Vec<NodeIdx>]) -> Option<f64> {
    let n = graph.node_count();
    let mut membership = vec![usize::MAX; n];
    for (c, group) in groups.iter().enumerate() {
        for &node in group {
            membership[node] = c;
        }
    }

    let mut seen: HashSet<(NodeIdx, NodeIdx)> = HashSet::new();
    let mut internal = vec![0.0; groups.len()];
    let mut degree_sum = vec![0.0; groups.len()];
    let mut m: f64 = 0.0;

    for (u, v, _) in graph.edges() {
        let key = if u < v { (u, v) } else { (v, u) };
        if !seen.insert(key) {
            continue;
        }
        m += 1.0;
        let (cu, cv) = (membership[u], membership[v]);
        if cu == usize::MAX || cv == usize::MAX {
            continue;
        }
        degree_sum[cu] += 1.0;
        degree_sum[cv] += 1.0;
        if cu == cv {
            internal[cu] += 1.0;
        }
    }

    if m == 0.0 {
        return None;
    }

    Some(
        internal
            .iter()
            .zip(&degree_sum)
            .map(|(&l, &d)| l / m - (d / (2.0 * m)).powi(2))
            .sum(),
    )
}
