//! Record filter: validates and normalizes one extracted message.
//!
//! Rules run in a fixed order and the first failure decides the rejection reason:
//! boilerplate subject, short body, sender domain, receiver list, date.

use crate::config::AnalysisConfig;
use chrono::{Timelike, Utc};

use crate::utils::parse_datetime_local;

use super::types::*;

/// Stateless validator bound to a configuration
pub struct RecordFilter<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> RecordFilter<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Validate a single record.
    pub fn validate(&self, record: &RawRecord) -> Result<ValidatedMessage, RejectReason> {
        if self.config.is_boilerplate_subject(&record.subject) {
            return Err(RejectReason::BoilerplateSubject);
        }

        if record.body.trim().chars().count() < self.config.min_body_length {
            return Err(RejectReason::ShortBody);
        }

        let sender = record.sender.trim().to_lowercase();
        if !self.config.is_valid_address(&sender) {
            return Err(RejectReason::InvalidSender);
        }

        let receivers = self.split_receivers(&record.receivers);
        if receivers.is_empty() {
            return Err(RejectReason::NoValidReceivers);
        }

        let local = parse_datetime_local(&record.date).ok_or(RejectReason::UnparseableDate)?;

        Ok(ValidatedMessage {
            sender,
            receivers,
            timestamp: local.with_timezone(&Utc),
            sent_hour: local.hour(),
            subject: record.subject.trim().to_string(),
            body: record.body.clone(),
        })
    }

    /// Validate a record and account for the outcome in `stats`
    pub fn apply(&self, record: &RawRecord, stats: &mut FilterStats) -> Option<ValidatedMessage> {
        match self.validate(record) {
            Ok(message) => {
                stats.kept += 1;
                Some(message)
            }
            Err(reason) => {
                stats.record_rejection(reason);
                None
            }
        }
    }

    /// Split a raw receiver list, keeping only addresses in accepted domains.
    fn split_receivers(&self, raw: &str) -> Vec<String> {
        let flattened: String = raw.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')).collect();

        flattened
            .split(',')
            .map(|r| r.trim().to_lowercase())
            .filter(|r| r.contains('@') && self.config.is_valid_address(r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RawRecord {
        RawRecord {
            sender: "Alice@Enron.com".to_string(),
            receivers: "bob@enron.com, carol@enron.com,\n\tdave@gmail.com".to_string(),
            subject: "Project".to_string(),
            date: "Mon, 14 May 2001 16:39:00 -0700 (PDT)".to_string(),
            body: "Please review the attached term sheet before Friday.".to_string(),
        }
    }

    #[test]
    fn test_valid_record() {
        let config = AnalysisConfig::default();
        let message = RecordFilter::new(&config).validate(&record()).unwrap();
        assert_eq!(message.sender, "alice@enron.com");
        assert_eq!(message.receivers, vec!["bob@enron.com", "carol@enron.com"]);
        // 16:39 on the sender's clock, 23:39 UTC
        assert_eq!(message.sent_hour, 16);
    }

    #[test]
    fn test_rule_order() {
        let config = AnalysisConfig::default();
        let filter = RecordFilter::new(&config);

        let mut r = record();
        r.subject = "Out of Office: back Monday".to_string();
        r.body = "short".to_string();
        assert_eq!(filter.validate(&r), Err(RejectReason::BoilerplateSubject));

        let mut r = record();
        r.body = "   too short   ".to_string();
        r.sender = "x@gmail.com".to_string();
        assert_eq!(filter.validate(&r), Err(RejectReason::ShortBody));

        let mut r = record();
        r.sender = "x@gmail.com".to_string();
        assert_eq!(filter.validate(&r), Err(RejectReason::InvalidSender));

        let mut r = record();
        r.receivers = "dave@gmail.com, not-an-address".to_string();
        r.date = "garbage".to_string();
        assert_eq!(filter.validate(&r), Err(RejectReason::NoValidReceivers));

        let mut r = record();
        r.date = "garbage".to_string();
        assert_eq!(filter.validate(&r), Err(RejectReason::UnparseableDate));
    }

    #[test]
    fn test_duplicate_receivers_kept() {
        let config = AnalysisConfig::default();
        let mut r = record();
        r.receivers = "bob@enron.com, bob@enron.com".to_string();
        let message = RecordFilter::new(&config).validate(&r).unwrap();
        assert_eq!(message.receivers.len(), 2);
    }

    #[test]
    fn test_wrapped_address_is_joined() {
        let config = AnalysisConfig::default();
        let mut r = record();
        r.receivers = "bob.smi\nth@enron.com".to_string();
        let message = RecordFilter::new(&config).validate(&r).unwrap();
        assert_eq!(message.receivers, vec!["bob.smith@enron.com"]);
    }

    #[test]
    fn test_apply_counts() {
        let config = AnalysisConfig::default();
        let filter = RecordFilter::new(&config);
        let mut stats = FilterStats::default();

        let mut bad = record();
        bad.body.clear();

        assert!(filter.apply(&record(), &mut stats).is_some());
        assert!(filter.apply(&bad, &mut stats).is_none());
        assert_eq!(stats.kept, 1);
        assert_eq!(stats.rejected.get(&RejectReason::ShortBody), Some(&1));
        assert_eq!(stats.total_rejected(), 1);
    }
}
