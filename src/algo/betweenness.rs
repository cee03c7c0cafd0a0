//! Betweenness centrality (Brandes), exact, source-sampled and source/target-subset.
//!
//! Shortest paths are unweighted and follow edge direction. Scores are normalized by
//! `1 / ((n - 1)(n - 2))`; sampled runs are further scaled by `n / k`.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::VecDeque;

use crate::analysis::graph::{InteractionGraph, NodeIdx};

/// Shortest-path DAG from one source
struct ShortestPaths {
    /// Nodes in non-decreasing distance order
    order: Vec<NodeIdx>,
    preds: Vec<Vec<NodeIdx>>,
    sigma: Vec<f64>,
}

fn single_source(graph: &InteractionGraph, source: NodeIdx) -> ShortestPaths {
    let n = graph.node_count();
    let mut order = Vec::new();
    let mut preds: Vec<Vec<NodeIdx>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0; n];
    let mut dist: Vec<i64> = vec![-1; n];

    sigma[source] = 1.0;
    dist[source] = 0;
    let mut queue = VecDeque::from([source]);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for (w, _) in graph.successors(v) {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    ShortestPaths { order, preds, sigma }
}

/// Dependency accumulation for all targets
fn accumulate(paths: &ShortestPaths, source: NodeIdx, scores: &mut [f64]) {
    let mut delta = vec![0.0; scores.len()];
    for &w in paths.order.iter().rev() {
        let coeff = (1.0 + delta[w]) / paths.sigma[w];
        for &v in &paths.preds[w] {
            delta[v] += paths.sigma[v] * coeff;
        }
        if w != source {
            scores[w] += delta[w];
        }
    }
}

/// Dependency accumulation restricted to a target set
fn accumulate_subset(paths: &ShortestPaths, source: NodeIdx, is_target: &[bool], scores: &mut [f64]) {
    let mut delta = vec![0.0; scores.len()];
    for &w in paths.order.iter().rev() {
        let coeff = if is_target[w] && w != source {
            (1.0 + delta[w]) / paths.sigma[w]
        } else {
            delta[w] / paths.sigma[w]
        };
        for &v in &paths.preds[w] {
            delta[v] += paths.sigma[v] * coeff;
        }
        if w != source {
            scores[w] += delta[w];
        }
    }
}

fn normalization(n: usize) -> f64 {
    if n <= 2 {
        1.0
    } else {
        1.0 / ((n - 1) as f64 * (n - 2) as f64)
    }
}

fn sum_vectors(mut a: Vec<f64>, b: Vec<f64>) -> Vec<f64> {
    for (x, y) in a.iter_mut().zip(b) {
        *x += y;
    }
    a
}

/// Betweenness centrality over all sources, or over `sample_size` random sources.
///
/// A sample at least as large as the graph falls back to the exact computation.
pub fn betweenness_centrality(graph: &InteractionGraph, sample_size: Option<usize>, seed: u64) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let sources: Vec<NodeIdx> = match sample_size {
        Some(k) if k < n => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = sample(&mut rng, n, k).into_vec();
            picked.sort_unstable();
            picked
        }
        _ => (0..n).collect(),
    };

    let mut scores = sources
        .par_iter()
        .fold(
            || vec![0.0; n],
            |mut acc, &s| {
                let paths = single_source(graph, s);
                accumulate(&paths, s, &mut acc);
                acc
            },
        )
        .reduce(|| vec![0.0; n], sum_vectors);

    let mut scale = normalization(n);
    if sources.len() < n {
        scale *= n as f64 / sources.len() as f64;
    }
    for score in scores.iter_mut() {
        *score *= scale;
    }
    scores
}

/// Betweenness counting only shortest paths from `sources` to `targets`
pub fn subset_betweenness(graph: &InteractionGraph, sources: &[NodeIdx], targets: &[NodeIdx]) -> Vec<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut is_target = vec![false; n];
    for &t in targets {
        is_target[t] = true;
    }

    let mut scores = sources
        .par_iter()
        .fold(
            || vec![0.0; n],
            |mut acc, &s| {
                let paths = single_source(graph, s);
                accumulate_subset(&paths, s, &is_target, &mut acc);
                acc
            },
        )
        .reduce(|| vec![0.0; n], sum_vectors);

    let scale = normalization(n);
    for score in scores.iter_mut() {
        *score *= scale;
    }
    scores
}
