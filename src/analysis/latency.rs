//! Reply latency matching.
//!
//! A message from `s` to `r` on thread `t` answers the oldest unanswered message from
//! `r` to `s` on the same thread. Every message then becomes an outstanding entry in its
//! own direction. Entries are consumed even when the resulting latency falls outside the
//! accepted bounds.
//!
//! Input is matched in arrival order; nothing is sorted here. Out-of-order input yields
//! negative or inflated latencies, most of which the bounds discard.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use crate::config::AnalysisConfig;
use crate::utils::hours_between;

/// Direction and thread a message travels on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub from: String,
    pub to: String,
    pub thread: String,
}

impl ConversationKey {
    pub fn new(from: &str, to: &str, thread: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            thread: thread.to_string(),
        }
    }

    /// The opposite direction on the same thread
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
            thread: self.thread.clone(),
        }
    }
}

/// Outcome of observing one (sender, receiver) slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchOutcome {
    /// Nothing outstanding in the opposite direction
    Unmatched,
    /// Matched and within bounds; the sample belongs to the sender
    Recorded(f64),
    /// Matched but outside bounds; the queue entry is still consumed
    Discarded(f64),
}

/// FIFO queues of unanswered messages, one per conversation key
#[derive(Debug, Clone)]
pub struct ReplyLatencyMatcher {
    pending: HashMap<ConversationKey, VecDeque<DateTime<Utc>>>,
    min_hours: f64,
    max_hours: f64,
}

impl ReplyLatencyMatcher {
    pub fn new(min_hours: f64, max_hours: f64) -> Self {
        Self {
            pending: HashMap::new(),
            min_hours,
            max_hours,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.rt_min_hours, config.rt_max_hours)
    }

    /// Observe one message slot from `sender` to `receiver`.
    pub fn observe(
        &mut self,
        sender: &str,
        receiver: &str,
        thread: &str,
        timestamp: DateTime<Utc>,
    ) -> MatchOutcome {
        let key = ConversationKey::new(sender, receiver, thread);

        let outcome = match self.pending.get_mut(&key.reversed()).and_then(|q| q.pop_front()) {
            Some(original) => {
                let elapsed = hours_between(original, timestamp);
                if elapsed > self.min_hours && elapsed < self.max_hours {
                    MatchOutcome::Recorded(elapsed)
                } else {
                    MatchOutcome::Discarded(elapsed)
                }
            }
            None => MatchOutcome::Unmatched,
        };

        self.pending.entry(key).or_default().push_back(timestamp);
        outcome
    }

    /// Number of outstanding entries for a direction
    pub fn pending_len(&self, from: &str, to: &str, thread: &str) -> usize {
        self.pending
            .get(&ConversationKey::new(from, to, thread))
            .map(|q| q.len())
            .unwrap_or(0)
    }

    /// Total outstanding entries across all keys
    pub fn total_pending(&self) -> usize {
        self.pending.values().map(|q| q.len()).sum()
    }
}
