//! End-to-end tests through the public API.

use std::fs;
use std::io::Write;

use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};
use tempfile::{tempdir, NamedTempFile};

use commgraph::algo::{BuiltinAlgorithms, GraphAlgorithms};
use commgraph::analysis::{self, ingest_messages, PipelineOptions, Typology};
use commgraph::config::{AnalysisConfig, EiVariant};
use commgraph::config_loader;
use commgraph::corpus::{self, FilterStats, RejectReason, ValidatedMessage};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 5, 14, 9, 0, 0).unwrap()
}

fn message(from: &str, to: &[&str], subject: &str, at: DateTime<Utc>) -> ValidatedMessage {
    ValidatedMessage {
        sender: from.to_string(),
        receivers: to.iter().map(|s| s.to_string()).collect(),
        timestamp: at,
        sent_hour: at.hour(),
        subject: subject.to_string(),
        body: "A body that is long enough to pass the filter.".to_string(),
    }
}

#[test]
fn test_reply_scenario() {
    let messages = vec![
        message("a@enron.com", &["b@enron.com"], "Project", t0()),
        message("b@enron.com", &["a@enron.com"], "Re: Project", t0() + Duration::hours(2)),
        message("a@enron.com", &["c@enron.com"], "Project", t0() + Duration::hours(50)),
    ];

    let corpus = ingest_messages(&messages, &AnalysisConfig::default());
    let graph = &corpus.graph;

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.edge_weight("a@enron.com", "b@enron.com"), Some(1));
    assert_eq!(graph.edge_weight("b@enron.com", "a@enron.com"), Some(1));
    assert_eq!(graph.edge_weight("a@enron.com", "c@enron.com"), Some(1));

    assert_eq!(corpus.user_stats["b@enron.com"].response_times, vec![2.0]);
    assert!(corpus.user_stats["a@enron.com"].response_times.is_empty());
    assert_eq!(corpus.latency_samples, 1);

    let algorithms = BuiltinAlgorithms::default();
    assert_eq!(algorithms.largest_component(graph, &Default::default()), 3);
}

/// Two 12-member cliques joined by one edge plus a detached triangle
fn clique_corpus() -> Vec<ValidatedMessage> {
    let mut messages = Vec::new();
    let mut at = t0();
    let mut clique = |prefix: &str, size: usize, messages: &mut Vec<ValidatedMessage>| {
        let members: Vec<String> = (0..size).map(|i| format!("{}{:02}@enron.com", prefix, i)).collect();
        for from in &members {
            for to in &members {
                if from != to {
                    messages.push(message(from, &[to.as_str()], "Planning", at));
                    at += Duration::minutes(30);
                }
            }
        }
    };
    clique("east", 12, &mut messages);
    clique("west", 12, &mut messages);
    clique("tiny", 3, &mut messages);
    messages.push(message("east00@enron.com", &["west00@enron.com"], "Bridge", t0()));
    messages
}

#[test]
fn test_small_communities_are_dropped() {
    let messages = clique_corpus();
    let config = AnalysisConfig::default();
    let algorithms = BuiltinAlgorithms::new(config.betweenness_seed);

    let report = analysis::run_pipeline(
        &messages,
        &FilterStats::default(),
        &config,
        &algorithms,
        &PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.ingestion.nodes, 27);
    assert_eq!(report.ingestion.largest_component, 24);
    assert!(report.modularity.unwrap() > 0.3);

    assert_eq!(report.communities.len(), 2);
    for community in &report.communities {
        assert!(community.size >= config.min_community_size);
        assert!(community.fragmentation_impact_pct > 0.0);
    }
    let mut ids: Vec<&str> = report.communities.iter().map(|c| c.id.as_str()).collect();
    ids.sort();
    assert!(ids.iter().all(|id| id.starts_with("C1_") || id.starts_with("C2_")));

    let tiny: Vec<_> = report
        .individuals
        .iter()
        .filter(|r| r.user.starts_with("tiny"))
        .collect();
    assert_eq!(tiny.len(), 3);
    assert!(tiny.iter().all(|r| r.community == analysis::individual::UNKNOWN_COMMUNITY));

    let users: Vec<&str> = report.individuals.iter().map(|r| r.user.as_str()).collect();
    let mut sorted = users.clone();
    sorted.sort();
    assert_eq!(users, sorted);

    let robustness = report.robustness.as_ref().unwrap();
    assert_eq!(robustness.community_id, report.communities[0].id);
    assert_eq!(robustness.original_lcc, 24);
    assert_eq!(robustness.load_absorbers.len(), config.removal_count);

    let silos = &report.diagnostics.silos;
    assert_eq!(silos.component_count, 2);
    assert_eq!(silos.largest_component, 24);
    assert_eq!(silos.second_largest_component, Some(3));
    // Everyone in a clique answers everyone
    assert!(report.diagnostics.passive_leaders.is_empty());
    assert!(report.diagnostics.after_hours_senders.len() <= config.top_n);
}

#[test]
fn test_unknown_target_community_fails() {
    let messages = clique_corpus();
    let config = AnalysisConfig::default();
    let algorithms = BuiltinAlgorithms::default();
    let options = PipelineOptions {
        corpus_label: "cliques".to_string(),
        target_community: Some("C99_nobody".to_string()),
    };

    let result = analysis::run_pipeline(&messages, &FilterStats::default(), &config, &algorithms, &options);
    assert!(result.is_err());
}

#[test]
fn test_empty_corpus() {
    let report = analysis::run_pipeline(
        &[],
        &FilterStats::default(),
        &AnalysisConfig::default(),
        &BuiltinAlgorithms::default(),
        &PipelineOptions::default(),
    )
    .unwrap();

    assert_eq!(report.ingestion.nodes, 0);
    assert!(report.modularity.is_none());
    assert!(report.communities.is_empty());
    assert!(report.robustness.is_none());
}

fn csv_row(file: &str, raw: &str) -> String {
    format!("\"{}\",\"{}\"\n", file, raw.replace('"', "\"\""))
}

fn raw_message(from: &str, to: &str, subject: &str, date: &str) -> String {
    format!(
        "Message-ID: <1@example>\nDate: {}\nFrom: {}\nTo: {}\nSubject: {}\n\nPlease review the attached draft before Friday's meeting.",
        date, from, to, subject
    )
}

#[test]
fn test_csv_and_yaml_run() {
    let mut config_file = NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "min_community_size: 2\nei_for_typology: count\nbetweenness_sample_size: null\nremoval_count: 1\nvalid_domains:\n  - enron.com"
    )
    .unwrap();
    let config = config_loader::load_config(config_file.path()).unwrap();
    assert_eq!(config.ei_for_typology, EiVariant::Count);
    assert!(config.betweenness_sample_size.is_none());

    let mut data = String::from("file,message\n");
    data.push_str(&csv_row(
        "a/1",
        &raw_message("a@enron.com", "b@enron.com", "Draft", "Mon, 14 May 2001 09:00:00 -0700 (PDT)"),
    ));
    data.push_str(&csv_row(
        "b/1",
        &raw_message("b@enron.com", "a@enron.com", "RE: Draft", "Mon, 14 May 2001 12:00:00 -0700 (PDT)"),
    ));
    data.push_str(&csv_row(
        "a/2",
        &raw_message("a@enron.com", "x@other.com", "Draft", "Mon, 14 May 2001 13:00:00 -0700 (PDT)"),
    ));
    data.push_str(&csv_row(
        "a/3",
        &raw_message("a@enron.com", "b@enron.com", "Out of Office", "Mon, 14 May 2001 14:00:00 -0700 (PDT)"),
    ));

    let mut corpus_file = NamedTempFile::new().unwrap();
    corpus_file.write_all(data.as_bytes()).unwrap();

    let loaded = corpus::load_corpus(corpus_file.path(), &config).unwrap();
    assert_eq!(loaded.stats.rows_read, 4);
    assert_eq!(loaded.messages.len(), 2);
    assert_eq!(loaded.stats.rejected.get(&RejectReason::NoValidReceivers), Some(&1));
    assert_eq!(loaded.stats.rejected.get(&RejectReason::BoilerplateSubject), Some(&1));

    let algorithms = BuiltinAlgorithms::new(config.betweenness_seed);
    let report = analysis::run_pipeline(
        &loaded.messages,
        &loaded.stats,
        &config,
        &algorithms,
        &PipelineOptions {
            corpus_label: corpus_file.path().display().to_string(),
            target_community: None,
        },
    )
    .unwrap();

    assert_eq!(report.ingestion.messages_kept, 2);
    assert_eq!(report.ingestion.latency_samples, 1);
    assert_eq!(report.communities.len(), 1);

    let community = &report.communities[0];
    assert_eq!(community.size, 2);
    assert_eq!(community.avg_response_hours, Some(3.0));
    assert_eq!(community.ei_index, -1.0);
    assert_eq!(community.fragmentation_impact_pct, 100.0);
    assert_eq!(community.typology, Typology::Bureaucratic);

    // The 12:00 -0700 reply is 19:00 UTC; only the sender's clock counts
    assert!(report.diagnostics.after_hours_senders.is_empty());
    assert_eq!(report.diagnostics.silos.component_count, 1);

    let out = tempdir().unwrap();
    analysis::generate_json_report(&report, &out.path().join("full_report.json")).unwrap();
    analysis::generate_text_report(&report, &out.path().join("report.txt")).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join("full_report.json")).unwrap()).unwrap();
    assert_eq!(json["ingestion"]["rejected"]["no_valid_receivers"], 1);
    assert_eq!(json["communities"][0]["size"], 2);
    assert!(fs::read_to_string(out.path().join("report.txt"))
        .unwrap()
        .contains(&community.id));
}
