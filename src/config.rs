//! Analysis configuration.
//!
//! Every knob of the batch run is fixed at start-up in an [`AnalysisConfig`]. Values come
//! from the built-in defaults, optionally overlaid by a YAML file and command-line flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which External-Internal index variant drives the typology's openness predicate
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EiVariant {
    /// Count distinct edges
    Count,
    /// Sum edge weights (message volume)
    #[default]
    Weight,
}

/// Configuration for a single analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum trimmed body length for a message to be kept
    pub min_body_length: usize,
    /// Lower exclusive bound for a response-time sample, in hours
    pub rt_min_hours: f64,
    /// Upper exclusive bound for a response-time sample, in hours
    pub rt_max_hours: f64,
    /// Average response time above which a user or community counts as slow
    pub slow_threshold_hours: f64,
    /// E-I index above which a community counts as open
    pub openness_threshold: f64,
    /// Accepted address domains (compared case-insensitively)
    pub valid_domains: BTreeSet<String>,
    /// Case-insensitive subject substrings marking boilerplate mail
    pub skip_subjects: Vec<String>,
    /// Smallest community retained in the typology table
    pub min_community_size: usize,
    /// Source sample size for approximate betweenness (`None` = exact)
    pub betweenness_sample_size: Option<usize>,
    /// Seed for the betweenness source sample
    pub betweenness_seed: u64,
    /// E-I variant used for typology
    pub ei_for_typology: EiVariant,
    /// Key reply matching on the normalized subject
    pub subject_threading: bool,
    /// Stable-sort validated messages by timestamp before ingestion
    pub sort_by_timestamp: bool,
    /// Maximum number of corpus rows considered (`None` = all)
    pub record_limit: Option<usize>,
    /// Members removed per strategy in the robustness simulation
    pub removal_count: usize,
    /// Share of top members used for workload skew
    pub workload_top_fraction: f64,
    /// Rows shown in console summaries and kept in diagnostic lists
    pub top_n: usize,
    /// Sender-clock hour at which after-hours mail starts (inclusive)
    pub after_hours_start: u32,
    /// Sender-clock hour at which after-hours mail ends (exclusive)
    pub after_hours_end: u32,
    /// Distinct senders above which a user can be flagged as a passive leader
    pub passive_min_in_degree: usize,
    /// `out_degree / (in_degree + 1)` below which a busy user counts as passive
    pub passive_max_ratio: f64,
}

impl AnalysisConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.rt_min_hours >= 0.0 && self.rt_min_hours < self.rt_max_hours) {
            return Err(ValidationError::InvalidLatency(format!(
                "response-time bounds must satisfy 0 <= min < max (got {} .. {})",
                self.rt_min_hours, self.rt_max_hours
            )));
        }
        if !self.slow_threshold_hours.is_finite() || self.slow_threshold_hours < 0.0 {
            return Err(ValidationError::InvalidLatency(
                "slow threshold must be a non-negative number of hours".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.openness_threshold) {
            return Err(ValidationError::InvalidCommunity(format!(
                "openness threshold {} is outside [-1, 1]",
                self.openness_threshold
            )));
        }
        if self.valid_domains.is_empty() {
            return Err(ValidationError::InvalidFilter(
                "at least one valid domain is required".to_string(),
            ));
        }
        if self.valid_domains.iter().any(|d| d.trim().is_empty() || d.contains('@')) {
            return Err(ValidationError::InvalidFilter(
                "domains must be bare host names without '@'".to_string(),
            ));
        }
        if self.min_community_size == 0 {
            return Err(ValidationError::InvalidCommunity(
                "min_community_size must be at least 1".to_string(),
            ));
        }
        if self.removal_count == 0 {
            return Err(ValidationError::InvalidCommunity(
                "removal_count must be at least 1".to_string(),
            ));
        }
        if !(self.workload_top_fraction > 0.0 && self.workload_top_fraction <= 1.0) {
            return Err(ValidationError::InvalidCommunity(format!(
                "workload_top_fraction {} is outside (0, 1]",
                self.workload_top_fraction
            )));
        }
        if self.after_hours_start > 23 || self.after_hours_end > 23 {
            return Err(ValidationError::InvalidDiagnostics(format!(
                "after-hours window {}..{} must use hours 0-23",
                self.after_hours_start, self.after_hours_end
            )));
        }
        if !(self.passive_max_ratio.is_finite() && self.passive_max_ratio >= 0.0) {
            return Err(ValidationError::InvalidDiagnostics(
                "passive_max_ratio must be a non-negative number".to_string(),
            ));
        }
        if self.betweenness_sample_size == Some(0) {
            return Err(ValidationError::InvalidCentrality(
                "betweenness_sample_size must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an address belongs to one of the accepted domains.
    ///
    /// The domain is the text after the last '@', compared case-insensitively.
    pub fn is_valid_address(&self, address: &str) -> bool {
        let address = address.trim();
        match address.rsplit_once('@') {
            Some((_, domain)) => {
                let domain = domain.to_lowercase();
                self.valid_domains.iter().any(|d| d.eq_ignore_ascii_case(&domain))
            }
            None => false,
        }
    }

    /// Whether an hour on the sender's clock falls in the after-hours window.
    ///
    /// A window whose start is after its end wraps past midnight.
    pub fn is_after_hours(&self, hour: u32) -> bool {
        let (start, end) = (self.after_hours_start, self.after_hours_end);
        if start <= end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }

    /// Whether a subject matches the boilerplate list
    pub fn is_boilerplate_subject(&self, subject: &str) -> bool {
        let subject = subject.to_lowercase();
        self.skip_subjects
            .iter()
            .any(|s| !s.is_empty() && subject.contains(&s.to_lowercase()))
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid response-time configuration: {0}")]
    InvalidLatency(String),
    #[error("Invalid record filter configuration: {0}")]
    InvalidFilter(String),
    #[error("Invalid community configuration: {0}")]
    InvalidCommunity(String),
    #[error("Invalid centrality configuration: {0}")]
    InvalidCentrality(String),
    #[error("Invalid diagnostics configuration: {0}")]
    InvalidDiagnostics(String),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            min_body_length: 30,
            rt_min_hours: 0.1,
            rt_max_hours: 168.0,
            slow_threshold_hours: 24.0,
            openness_threshold: -0.2,
            valid_domains: ["enron.com".to_string()].into_iter().collect(),
            skip_subjects: [
                "accepted:",
                "declined:",
                "tentative:",
                "automatic reply:",
                "out of office",
                "demand for payment",
                "newsletter",
                "daily report",
                "status change",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            min_community_size: 10,
            betweenness_sample_size: Some(200),
            betweenness_seed: 42,
            ei_for_typology: EiVariant::Weight,
            subject_threading: true,
            sort_by_timestamp: false,
            record_limit: Some(500_000),
            removal_count: 10,
            workload_top_fraction: 0.1,
            top_n: 10,
            after_hours_start: 19,
            after_hours_end: 6,
            passive_min_in_degree: 10,
            passive_max_ratio: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_body_length, 30);
        assert_eq!(config.min_community_size, 10);
        assert_eq!(config.ei_for_typology, EiVariant::Weight);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
slow_threshold_hours: 12
valid_domains: ["example.org", "corp.example.org"]
ei_for_typology: count
"#;
        let config: AnalysisConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.slow_threshold_hours, 12.0);
        assert_eq!(config.ei_for_typology, EiVariant::Count);
        assert_eq!(config.valid_domains.len(), 2);
        assert_eq!(config.min_body_length, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let config = AnalysisConfig {
            rt_min_hours: 200.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidLatency(_))));

        let config = AnalysisConfig {
            valid_domains: BTreeSet::new(),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFilter(_))));

        let config = AnalysisConfig {
            betweenness_sample_size: Some(0),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCentrality(_))));
    }

    #[test]
    fn test_address_domain_match() {
        let config = AnalysisConfig::default();
        assert!(config.is_valid_address("jeff.skilling@enron.com"));
        assert!(config.is_valid_address("Jeff.Skilling@ENRON.COM"));
        assert!(!config.is_valid_address("someone@notenron.com"));
        assert!(!config.is_valid_address("someone@enron.com.au"));
        assert!(!config.is_valid_address("no-at-sign"));
        assert!(config.is_valid_address("odd@name@enron.com"));
    }

    #[test]
    fn test_after_hours_window_wraps_midnight() {
        let config = AnalysisConfig::default();
        assert!(config.is_after_hours(19));
        assert!(config.is_after_hours(23));
        assert!(config.is_after_hours(0));
        assert!(config.is_after_hours(5));
        assert!(!config.is_after_hours(6));
        assert!(!config.is_after_hours(18));

        let config = AnalysisConfig {
            after_hours_start: 12,
            after_hours_end: 14,
            ..AnalysisConfig::default()
        };
        assert!(config.is_after_hours(13));
        assert!(!config.is_after_hours(20));

        let config = AnalysisConfig {
            after_hours_start: 24,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidDiagnostics(_))));
    }

    #[test]
    fn test_boilerplate_subject() {
        let config = AnalysisConfig::default();
        assert!(config.is_boilerplate_subject("Accepted: Staff meeting"));
        assert!(config.is_boilerplate_subject("Weekly NEWSLETTER"));
        assert!(!config.is_boilerplate_subject("Re: Project"));
    }
}
