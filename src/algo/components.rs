//! Weakly connected components via union-find.
//!
//! Removal experiments pass an exclusion set instead of mutating the graph: excluded
//! nodes and all their edges are ignored, which is equivalent to running on a copy
//! with those nodes removed.

use std::collections::{BTreeMap, HashSet};

use crate::analysis::graph::{InteractionGraph, NodeIdx};

/// Union-Find data structure
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        UnionFind {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);

        if root_i != root_j {
            if self.rank[root_i] < self.rank[root_j] {
                self.parent[root_i] = root_j;
            } else if self.rank[root_i] > self.rank[root_j] {
                self.parent[root_j] = root_i;
            } else {
                self.parent[root_j] = root_i;
                self.rank[root_i] += 1;
            }
        }
    }
}

/// Weakly connected components of the graph minus `excluded`.
///
/// Components are returned largest first; members are in index order.
pub fn weakly_connected_components(
    graph: &InteractionGraph,
    excluded: &HashSet<NodeIdx>,
) -> Vec<Vec<NodeIdx>> {
    let n = graph.node_count();
    let mut uf = UnionFind::new(n);

    for (u, v, _) in graph.edges() {
        if excluded.contains(&u) || excluded.contains(&v) {
            continue;
        }
        uf.union(u, v);
    }

    let mut by_root: BTreeMap<usize, Vec<NodeIdx>> = BTreeMap::new();
    for idx in 0..n {
        if excluded.contains(&idx) {
            continue;
        }
        let root = uf.find(idx);
        by_root.entry(root).or_default().push(idx);
    }

    let mut components: Vec<Vec<NodeIdx>> = by_root.into_values().collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));
    components
}

/// Size of the largest weakly connected component, 0 when nothing remains.
pub fn largest_component_size(graph: &InteractionGraph, excluded: &HashSet<NodeIdx>) -> usize {
    weakly_connected_components(graph, excluded)
        .first()
        .map(|c| c.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> InteractionGraph {
        // a->b, c->d->e, f<-e ; plus an isolated pair g->h
        let mut graph = InteractionGraph::new();
        graph.add_interaction("a", "b");
        graph.add_interaction("c", "d");
        graph.add_interaction("d", "e");
        graph.add_interaction("f", "e");
        graph.add_interaction("g", "h");
        graph
    }

    #[test]
    fn test_wcc() {
        let graph = sample_graph();
        let components = weakly_connected_components(&graph, &HashSet::new());

        assert_eq!(components.len(), 3);
        assert_eq!(components[0].len(), 4);
        assert_eq!(largest_component_size(&graph, &HashSet::new()), 4);
    }

    #[test]
    fn test_wcc_with_exclusion() {
        let graph = sample_graph();
        let d = graph.index_of("d").unwrap();
        let excluded: HashSet<NodeIdx> = [d].into_iter().collect();

        // c becomes isolated, e-f stay together
        let components = weakly_connected_components(&graph, &excluded);
        assert_eq!(components.len(), 4);
        assert_eq!(largest_component_size(&graph, &excluded), 2);
    }

    #[test]
    fn test_everything_excluded() {
        let graph = sample_graph();
        let excluded: HashSet<NodeIdx> = (0..graph.node_count()).collect();
        assert_eq!(largest_component_size(&graph, &excluded), 0);
        assert_eq!(largest_component_size(&InteractionGraph::new(), &HashSet::new()), 0);
    }
}
