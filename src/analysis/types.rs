//! Core data types for communication graph analysis.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::corpus::RejectReason;

/// Per-user counters gathered during ingestion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    /// Send timestamps in ingestion order
    pub timestamps: Vec<DateTime<Utc>>,
    /// Messages sent inside the after-hours window of the sender's clock
    pub after_hours_sent: u64,
    /// Accepted reply latencies in hours
    pub response_times: Vec<f64>,
    /// Receiver slots naming this user
    pub in_degree_count: u64,
    /// Receiver slots naming this user, kept as its own counter
    pub in_strength: u64,
    /// Receiver slots this user has sent to
    pub out_strength: u64,
}

impl UserStats {
    /// Mean response time, `None` without samples
    pub fn average_response_time(&self) -> Option<f64> {
        mean(&self.response_times)
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Four-way classification of a community by speed and openness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Typology {
    /// Slow and insular
    #[serde(rename = "Black Hole")]
    BlackHole,
    /// Slow and open
    #[serde(rename = "Overloaded Hub")]
    OverloadedHub,
    /// Fast and insular
    #[serde(rename = "Bureaucratic")]
    Bureaucratic,
    /// Fast and open
    #[serde(rename = "Agile Connector")]
    AgileConnector,
}

impl Typology {
    pub fn from_flags(is_slow: bool, is_open: bool) -> Self {
        match (is_slow, is_open) {
            (true, false) => Typology::BlackHole,
            (true, true) => Typology::OverloadedHub,
            (false, false) => Typology::Bureaucratic,
            (false, true) => Typology::AgileConnector,
        }
    }

    /// Classify from possibly missing metrics; a missing metric makes its predicate false.
    pub fn classify(
        avg_response_hours: Option<f64>,
        ei_index: Option<f64>,
        slow_threshold_hours: f64,
        openness_threshold: f64,
    ) -> Self {
        let is_slow = avg_response_hours.is_some_and(|rt| rt > slow_threshold_hours);
        let is_open = ei_index.is_some_and(|ei| ei > openness_threshold);
        Self::from_flags(is_slow, is_open)
    }
}

impl std::fmt::Display for Typology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Typology::BlackHole => write!(f, "Black Hole"),
            Typology::OverloadedHub => write!(f, "Overloaded Hub"),
            Typology::Bureaucratic => write!(f, "Bureaucratic"),
            Typology::AgileConnector => write!(f, "Agile Connector"),
        }
    }
}

/// One retained community ("department")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMetrics {
    /// `C{sequence}_{anchor local part}`
    pub id: String,
    pub size: usize,
    /// Member with the highest in-degree count
    pub anchor: String,
    /// Mean of member averages; `None` when no member has samples
    pub avg_response_hours: Option<f64>,
    /// Percentage of members slower than the slow threshold
    pub bottleneck_density_pct: f64,
    /// Share of in-degree volume held by the top members; `None` for zero volume
    pub workload_skew_pct: Option<f64>,
    pub ei_count: f64,
    pub ei_weight: f64,
    /// Variant selected for typology
    pub ei_index: f64,
    /// Percentage drop of the largest component when the members are removed
    pub fragmentation_impact_pct: f64,
    pub typology: Typology,
}

/// One row of the per-user table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualMetrics {
    pub user: String,
    /// Community id, or "Unknown"
    pub community: String,
    pub received_count: u64,
    pub avg_response_hours: Option<f64>,
    /// Percentage of outgoing weight sent to other communities
    pub external_out_pct: f64,
    pub betweenness: f64,
}

/// Result of the load-vs-connector removal experiment on one community
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub community_id: String,
    pub removal_count: usize,
    pub original_lcc: usize,
    /// Top members by in-degree count
    pub load_absorbers: Vec<String>,
    pub lcc_after_load_removal: usize,
    pub loss_load_pct: f64,
    /// Top members by subset betweenness
    pub connectors: Vec<String>,
    pub lcc_after_connector_removal: usize,
    pub loss_connector_pct: f64,
    /// `loss_connector / loss_load`, only when the load loss is positive
    pub connector_impact_multiplier: Option<f64>,
}

/// A user mailing outside working hours
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfterHoursSender {
    pub user: String,
    pub after_hours_sent: u64,
    pub total_sent: usize,
}

/// A busy receiver who rarely writes back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveLeader {
    pub user: String,
    /// Distinct senders
    pub in_degree: usize,
    /// Distinct receivers
    pub out_degree: usize,
    /// `out_degree / (in_degree + 1)`
    pub ratio: f64,
}

/// How far the network splits into disconnected groups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiloDiagnosis {
    pub component_count: usize,
    pub largest_component: usize,
    pub second_largest_component: Option<usize>,
}

/// Graph-wide behavior checks, each list capped at `top_n`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorDiagnostics {
    pub after_hours_senders: Vec<AfterHoursSender>,
    pub passive_leaders: Vec<PassiveLeader>,
    pub silos: SiloDiagnosis,
}

/// Counters describing the ingestion pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub messages_kept: usize,
    pub rejected: BTreeMap<RejectReason, usize>,
    pub users: usize,
    pub nodes: usize,
    pub edges: usize,
    pub latency_samples: usize,
    pub discarded_samples: usize,
    pub largest_component: usize,
}

/// Analysis metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analysis_timestamp: String,
    pub corpus: String,
    pub config: AnalysisConfig,
}

/// Full analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullAnalysisReport {
    pub metadata: AnalysisMetadata,
    pub ingestion: IngestSummary,
    pub modularity: Option<f64>,
    /// Retained communities, most critical first
    pub communities: Vec<CommunityMetrics>,
    pub individuals: Vec<IndividualMetrics>,
    pub robustness: Option<RobustnessReport>,
    pub diagnostics: BehaviorDiagnostics,
}
