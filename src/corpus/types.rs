//! Record types flowing from the corpus into the analysis engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One message as handed over by text extraction, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub sender: String,
    /// Comma-separated receiver list, possibly spanning several lines
    pub receivers: String,
    pub subject: String,
    /// Free-text date header
    pub date: String,
    pub body: String,
}

/// A message that passed every filter rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMessage {
    /// Lower-cased sender address
    pub sender: String,
    /// Lower-cased receiver addresses in header order; duplicates are kept
    pub receivers: Vec<String>,
    pub timestamp: DateTime<Utc>,
    /// Hour of day on the sender's clock, as written in the Date header
    pub sent_hour: u32,
    pub subject: String,
    pub body: String,
}

/// Why a corpus row was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Row had too few columns or lacked From/To/Date headers
    MissingHeader,
    /// Subject matched the boilerplate list
    BoilerplateSubject,
    /// Body shorter than the configured minimum
    ShortBody,
    /// Sender outside the accepted domains
    InvalidSender,
    /// No receiver survived domain filtering
    NoValidReceivers,
    /// Date text could not be parsed
    UnparseableDate,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RejectReason::MissingHeader => "missing header",
            RejectReason::BoilerplateSubject => "boilerplate subject",
            RejectReason::ShortBody => "short body",
            RejectReason::InvalidSender => "invalid sender",
            RejectReason::NoValidReceivers => "no valid receivers",
            RejectReason::UnparseableDate => "unparseable date",
        };
        write!(f, "{}", label)
    }
}

/// Counters kept while filtering a corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterStats {
    pub rows_read: usize,
    pub kept: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
}

impl FilterStats {
    pub fn record_rejection(&mut self, reason: RejectReason) {
        *self.rejected.entry(reason).or_insert(0) += 1;
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }
}
