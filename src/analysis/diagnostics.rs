//! Workplace behavior diagnostics.
//!
//! Three graph-wide checks that sit beside the community typology: senders who mail
//! outside working hours, passive leaders who receive from many people but write to
//! few, and how far the network splits into disconnected silos.

use crate::algo::GraphAlgorithms;
use crate::config::AnalysisConfig;

use super::graph::InteractionGraph;
use super::ingest::IngestedCorpus;
use super::types::{AfterHoursSender, BehaviorDiagnostics, PassiveLeader, SiloDiagnosis};

/// Users with after-hours mail, most after-hours messages first
pub fn after_hours_senders(corpus: &IngestedCorpus, limit: usize) -> Vec<AfterHoursSender> {
    let mut senders: Vec<AfterHoursSender> = corpus
        .user_stats
        .iter()
        .filter(|(_, stats)| stats.after_hours_sent > 0)
        .map(|(user, stats)| AfterHoursSender {
            user: user.clone(),
            after_hours_sent: stats.after_hours_sent,
            total_sent: stats.timestamps.len(),
        })
        .collect();

    senders.sort_by(|a, b| {
        b.after_hours_sent
            .cmp(&a.after_hours_sent)
            .then_with(|| a.user.cmp(&b.user))
    });
    senders.truncate(limit);
    senders
}

/// Busy receivers that rarely write back, most distinct senders first.
///
/// A user qualifies when more than `passive_min_in_degree` distinct people wrote to
/// them and `out_degree / (in_degree + 1)` is below `passive_max_ratio`.
pub fn passive_leaders(graph: &InteractionGraph, config: &AnalysisConfig, limit: usize) -> Vec<PassiveLeader> {
    let mut leaders: Vec<PassiveLeader> = (0..graph.node_count())
        .filter_map(|idx| {
            let in_degree = graph.in_degree(idx);
            if in_degree <= config.passive_min_in_degree {
                return None;
            }
            let out_degree = graph.out_degree(idx);
            let ratio = out_degree as f64 / (in_degree + 1) as f64;
            (ratio < config.passive_max_ratio).then(|| PassiveLeader {
                user: graph.address(idx).to_string(),
                in_degree,
                out_degree,
                ratio,
            })
        })
        .collect();

    leaders.sort_by(|a, b| b.in_degree.cmp(&a.in_degree).then_with(|| a.user.cmp(&b.user)));
    leaders.truncate(limit);
    leaders
}

/// Weakly connected component count and the two largest sizes
pub fn silo_diagnosis(graph: &InteractionGraph, algorithms: &dyn GraphAlgorithms) -> SiloDiagnosis {
    let sizes = algorithms.component_sizes(graph);
    SiloDiagnosis {
        component_count: sizes.len(),
        largest_component: sizes.first().copied().unwrap_or(0),
        second_largest_component: sizes.get(1).copied(),
    }
}

/// Run every diagnostic over the finished corpus
pub fn diagnose(
    corpus: &IngestedCorpus,
    config: &AnalysisConfig,
    algorithms: &dyn GraphAlgorithms,
) -> BehaviorDiagnostics {
    let diagnostics = BehaviorDiagnostics {
        after_hours_senders: after_hours_senders(corpus, config.top_n),
        passive_leaders: passive_leaders(&corpus.graph, config, config.top_n),
        silos: silo_diagnosis(&corpus.graph, algorithms),
    };

    log::info!(
        "[Diagnostics] components={} after-hours senders={} passive leaders={}",
        diagnostics.silos.component_count,
        diagnostics.after_hours_senders.len(),
        diagnostics.passive_leaders.len()
    );
    diagnostics
}
