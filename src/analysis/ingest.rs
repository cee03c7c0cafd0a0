//! Single-pass ingestion of validated messages.
//!
//! [`IngestContext`] owns every accumulator mutated during ingestion: the interaction
//! graph, per-user stats and the reply matcher. Once [`IngestContext::finish`] is called
//! the results are read-only inputs for the downstream analysis.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::corpus::ValidatedMessage;
use crate::utils::thread_key;

use super::graph::InteractionGraph;
use super::latency::{MatchOutcome, ReplyLatencyMatcher};
use super::types::UserStats;

/// Finished ingestion state
#[derive(Debug, Clone, Default)]
pub struct IngestedCorpus {
    pub graph: InteractionGraph,
    pub user_stats: HashMap<String, UserStats>,
    pub messages_ingested: usize,
    pub latency_samples: usize,
    pub discarded_samples: usize,
}

impl IngestedCorpus {
    /// In-degree count of a user, 0 when unknown
    pub fn in_degree(&self, address: &str) -> u64 {
        self.user_stats
            .get(address)
            .map(|s| s.in_degree_count)
            .unwrap_or(0)
    }
}

/// Mutable accumulator for one corpus
pub struct IngestContext<'a> {
    config: &'a AnalysisConfig,
    graph: InteractionGraph,
    user_stats: HashMap<String, UserStats>,
    matcher: ReplyLatencyMatcher,
    messages_ingested: usize,
    latency_samples: usize,
    discarded_samples: usize,
}

impl<'a> IngestContext<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self {
            config,
            graph: InteractionGraph::new(),
            user_stats: HashMap::new(),
            matcher: ReplyLatencyMatcher::from_config(config),
            messages_ingested: 0,
            latency_samples: 0,
            discarded_samples: 0,
        }
    }

    /// Feed one message to the graph builder and the reply matcher
    pub fn ingest(&mut self, message: &ValidatedMessage) {
        let sender_stats = self.user_stats.entry(message.sender.clone()).or_default();
        sender_stats.timestamps.push(message.timestamp);
        if self.config.is_after_hours(message.sent_hour) {
            sender_stats.after_hours_sent += 1;
        }

        self.build_edges(message);
        self.match_replies(message);
        self.messages_ingested += 1;
    }

    /// Graph builder: one edge increment per receiver slot, self excluded
    fn build_edges(&mut self, message: &ValidatedMessage) {
        for receiver in &message.receivers {
            if !self.graph.add_interaction(&message.sender, receiver) {
                continue;
            }

            let receiver_stats = self.user_stats.entry(receiver.clone()).or_default();
            receiver_stats.in_degree_count += 1;
            receiver_stats.in_strength += 1;

            self.user_stats
                .entry(message.sender.clone())
                .or_default()
                .out_strength += 1;
        }
    }

    /// Reply matcher: per receiver slot, self excluded
    fn match_replies(&mut self, message: &ValidatedMessage) {
        let thread = thread_key(&message.subject, self.config.subject_threading);

        for receiver in &message.receivers {
            if *receiver == message.sender {
                continue;
            }

            match self
                .matcher
                .observe(&message.sender, receiver, &thread, message.timestamp)
            {
                MatchOutcome::Recorded(hours) => {
                    self.user_stats
                        .entry(message.sender.clone())
                        .or_default()
                        .response_times
                        .push(hours);
                    self.latency_samples += 1;
                }
                MatchOutcome::Discarded(hours) => {
                    log::trace!(
                        "Discarded latency {:.2}h for {} -> {}",
                        hours,
                        message.sender,
                        receiver
                    );
                    self.discarded_samples += 1;
                }
                MatchOutcome::Unmatched => {}
            }
        }
    }

    pub fn finish(self) -> IngestedCorpus {
        log::debug!("{} reply entries left unanswered", self.matcher.total_pending());
        IngestedCorpus {
            graph: self.graph,
            user_stats: self.user_stats,
            messages_ingested: self.messages_ingested,
            latency_samples: self.latency_samples,
            discarded_samples: self.discarded_samples,
        }
    }
}

/// Ingest a whole corpus in one pass.
///
/// Messages are processed in the given order unless `sort_by_timestamp` is set, in which
/// case they are stably sorted first.
pub fn ingest_messages(messages: &[ValidatedMessage], config: &AnalysisConfig) -> IngestedCorpus {
    let mut context = IngestContext::new(config);

    if config.sort_by_timestamp {
        let mut ordered: Vec<&ValidatedMessage> = messages.iter().collect();
        ordered.sort_by_key(|m| m.timestamp);
        for message in ordered {
            context.ingest(message);
        }
    } else {
        for message in messages {
            context.ingest(message);
        }
    }

    let corpus = context.finish();
    log::info!(
        "[Network] nodes={} edges={} latency samples={}",
        corpus.graph.node_count(),
        corpus.graph.edge_count(),
        corpus.latency_samples
    );
    corpus
}
