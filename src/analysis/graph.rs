//! Directed, weighted interaction graph.
//!
//! Nodes are user addresses interned to dense indices in first-seen order. An edge
//! `u -> v` carries the number of message instances sent by `u` naming `v` as a
//! receiver. Self-edges are never stored.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Dense node index into an [`InteractionGraph`]
pub type NodeIdx = usize;

#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    addresses: Vec<String>,
    index: HashMap<String, NodeIdx>,
    /// Outgoing edges with their weights
    successors: Vec<BTreeMap<NodeIdx, u64>>,
    /// Sources of incoming edges
    predecessors: Vec<BTreeSet<NodeIdx>>,
    edge_count: usize,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one receiver slot of one message.
    ///
    /// Creates the edge with weight 1 on first occurrence and increments it afterwards.
    /// Returns `false` without touching the graph when `from == to`.
    pub fn add_interaction(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }

        let u = self.intern(from);
        let v = self.intern(to);

        let weight = self.successors[u].entry(v).or_insert(0);
        if *weight == 0 {
            self.edge_count += 1;
            self.predecessors[v].insert(u);
        }
        *weight += 1;
        true
    }

    fn intern(&mut self, address: &str) -> NodeIdx {
        if let Some(&idx) = self.index.get(address) {
            return idx;
        }
        let idx = self.addresses.len();
        self.addresses.push(address.to_string());
        self.index.insert(address.to_string(), idx);
        self.successors.push(BTreeMap::new());
        self.predecessors.push(BTreeSet::new());
        idx
    }

    pub fn node_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn index_of(&self, address: &str) -> Option<NodeIdx> {
        self.index.get(address).copied()
    }

    pub fn address(&self, idx: NodeIdx) -> &str {
        &self.addresses[idx]
    }

    /// All addresses in node-index order
    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// Outgoing neighbours with edge weights, in index order
    pub fn successors(&self, idx: NodeIdx) -> impl Iterator<Item = (NodeIdx, u64)> + '_ {
        self.successors[idx].iter().map(|(&v, &w)| (v, w))
    }

    /// Incoming neighbours, in index order
    pub fn predecessors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
        self.predecessors[idx].iter().copied()
    }

    /// Number of distinct senders to `idx`
    pub fn in_degree(&self, idx: NodeIdx) -> usize {
        self.predecessors[idx].len()
    }

    /// Number of distinct receivers of `idx`
    pub fn out_degree(&self, idx: NodeIdx) -> usize {
        self.successors[idx].len()
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<u64> {
        let u = self.index_of(from)?;
        let v = self.index_of(to)?;
        self.successors[u].get(&v).copied()
    }

    /// Sum of weights on edges entering `idx`
    pub fn in_weight(&self, idx: NodeIdx) -> u64 {
        self.predecessors[idx]
            .iter()
            .filter_map(|&u| self.successors[u].get(&idx))
            .sum()
    }

    /// Sum of weights on edges leaving `idx`
    pub fn out_weight(&self, idx: NodeIdx) -> u64 {
        self.successors[idx].values().sum()
    }

    /// Neighbours ignoring direction; a node linked both ways appears once.
    pub fn undirected_neighbors(&self, idx: NodeIdx) -> BTreeSet<NodeIdx> {
        self.successors[idx]
            .keys()
            .copied()
            .chain(self.predecessors[idx].iter().copied())
            .collect()
    }

    /// Iterate every edge as `(from, to, weight)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeIdx, NodeIdx, u64)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(u, out)| out.iter().map(move |(&v, &w)| (u, v, w)))
    }
}
