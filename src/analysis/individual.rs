//! Per-user metrics table.

use crate::algo::CentralityScores;

use super::community::CommunityAnalysis;
use super::ingest::IngestedCorpus;
use super::types::IndividualMetrics;

/// Label for users outside every retained community
pub const UNKNOWN_COMMUNITY: &str = "Unknown";

/// Build one row per graph node, ordered by address.
///
/// Betweenness starts at 0.0; see [`attach_betweenness`].
pub fn build_individual_table(
    corpus: &IngestedCorpus,
    communities: &CommunityAnalysis,
) -> Vec<IndividualMetrics> {
    let graph = &corpus.graph;

    let mut rows: Vec<IndividualMetrics> = graph
        .addresses()
        .iter()
        .enumerate()
        .map(|(idx, user)| {
            let own = communities.community_of(user);

            let mut external = 0u64;
            let mut total = 0u64;
            for (v, w) in graph.successors(idx) {
                total += w;
                if communities.community_of(graph.address(v)) != own {
                    external += w;
                }
            }

            let stats = corpus.user_stats.get(user);
            IndividualMetrics {
                user: user.clone(),
                community: own.unwrap_or(UNKNOWN_COMMUNITY).to_string(),
                received_count: stats.map(|s| s.in_degree_count).unwrap_or(0),
                avg_response_hours: stats.and_then(|s| s.average_response_time()),
                external_out_pct: if total > 0 {
                    external as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
                betweenness: 0.0,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.user.cmp(&b.user));
    rows
}

/// Attach betweenness by address; users missing from `scores` get 0.0
pub fn attach_betweenness(rows: &mut [IndividualMetrics], scores: &CentralityScores) {
    for row in rows.iter_mut() {
        row.betweenness = scores.get(&row.user).copied().unwrap_or(0.0);
    }
}
