//! CSV corpus reading.
//!
//! The corpus is a CSV file with a header row whose second column holds the raw message
//! text. Rows are streamed, extracted and filtered in one pass; failure to open or frame
//! the file aborts the run. Message text is decoded lossily, so stray non-UTF-8 bytes
//! become U+FFFD instead of failing the row.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use crate::config::AnalysisConfig;

use super::extract::extract_record;
use super::filter::RecordFilter;
use super::types::*;

/// Column holding the raw message text
const MESSAGE_COLUMN: usize = 1;

/// Rows between progress log lines
const PROGRESS_INTERVAL: usize = 100_000;

/// Validated messages and the filtering counters of one corpus
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    pub messages: Vec<ValidatedMessage>,
    pub stats: FilterStats,
}

/// Read and filter a CSV corpus from disk
pub fn load_corpus(path: &Path, config: &AnalysisConfig) -> Result<LoadedCorpus> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus: {}", path.display()))?;
    let reader = BufReader::with_capacity(64 * 1024, file);

    read_corpus(reader, config)
        .with_context(|| format!("Failed to read corpus: {}", path.display()))
}

/// Read and filter a CSV corpus from any reader
pub fn read_corpus<R: Read>(reader: R, config: &AnalysisConfig) -> Result<LoadedCorpus> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let filter = RecordFilter::new(config);
    let mut corpus = LoadedCorpus::default();

    for (index, row) in csv_reader.byte_records().enumerate() {
        if config.record_limit.is_some_and(|limit| index >= limit) {
            break;
        }

        let row = row.with_context(|| format!("Malformed CSV at data row {}", index + 1))?;
        corpus.stats.rows_read += 1;

        let Some(raw_bytes) = row.get(MESSAGE_COLUMN) else {
            corpus.stats.record_rejection(RejectReason::MissingHeader);
            continue;
        };
        let raw_message = String::from_utf8_lossy(raw_bytes);

        match extract_record(&raw_message) {
            Ok(record) => {
                if let Some(message) = filter.apply(&record, &mut corpus.stats) {
                    corpus.messages.push(message);
                }
            }
            Err(reason) => corpus.stats.record_rejection(reason),
        }

        if (index + 1) % PROGRESS_INTERVAL == 0 {
            log::info!(
                "  processed {} rows | kept {}",
                index + 1,
                corpus.stats.kept
            );
        }
    }

    log::info!(
        "Corpus read: {} rows, {} kept, {} rejected",
        corpus.stats.rows_read,
        corpus.stats.kept,
        corpus.stats.total_rejected()
    );
    for (reason, count) in &corpus.stats.rejected {
        log::debug!("  rejected ({}): {}", reason, count);
    }

    Ok(corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_row(file: &str, message: &str) -> String {
        format!("\"{}\",\"{}\"\n", file, message.replace('"', "\"\""))
    }

    fn message(from: &str, to: &str, subject: &str) -> String {
        format!(
            "Date: Mon, 14 May 2001 16:39:00 -0700 (PDT)\nFrom: {}\nTo: {}\nSubject: {}\n\nThis body is comfortably longer than thirty characters.",
            from, to, subject
        )
    }

    #[test]
    fn test_read_corpus_filters_rows() {
        let mut data = String::from("file,message\n");
        data.push_str(&csv_row("a/1", &message("a@enron.com", "b@enron.com", "Hello")));
        data.push_str(&csv_row("a/2", &message("a@gmail.com", "b@enron.com", "Hello")));
        data.push_str(&csv_row("a/3", &message("a@enron.com", "b@enron.com", "Newsletter #4")));
        data.push_str("\"a/4\"\n");

        let corpus = read_corpus(data.as_bytes(), &AnalysisConfig::default()).unwrap();
        assert_eq!(corpus.stats.rows_read, 4);
        assert_eq!(corpus.messages.len(), 1);
        assert_eq!(corpus.stats.kept, 1);
        assert_eq!(corpus.stats.rejected.get(&RejectReason::InvalidSender), Some(&1));
        assert_eq!(corpus.stats.rejected.get(&RejectReason::BoilerplateSubject), Some(&1));
        assert_eq!(corpus.stats.rejected.get(&RejectReason::MissingHeader), Some(&1));
    }

    #[test]
    fn test_record_limit() {
        let mut data = String::from("file,message\n");
        for i in 0..5 {
            data.push_str(&csv_row(&format!("a/{}", i), &message("a@enron.com", "b@enron.com", "Hi")));
        }

        let config = AnalysisConfig {
            record_limit: Some(3),
            ..AnalysisConfig::default()
        };
        let corpus = read_corpus(data.as_bytes(), &config).unwrap();
        assert_eq!(corpus.stats.rows_read, 3);
        assert_eq!(corpus.messages.len(), 3);
    }

    #[test]
    fn test_invalid_utf8_row_is_kept() {
        let mut data = b"file,message\n".to_vec();
        data.extend_from_slice(csv_row("a/1", &message("a@enron.com", "b@enron.com", "Hi")).as_bytes());
        // Latin-1 "Café": a lone 0xE9 byte
        let mut latin1 = csv_row("a/2", &message("b@enron.com", "a@enron.com", "Caf~")).into_bytes();
        for byte in latin1.iter_mut().filter(|b| **b == b'~') {
            *byte = 0xE9;
        }
        data.extend_from_slice(&latin1);
        data.extend_from_slice(csv_row("a/3", &message("a@enron.com", "c@enron.com", "Hi")).as_bytes());
        assert!(std::str::from_utf8(&data).is_err());

        let corpus = read_corpus(data.as_slice(), &AnalysisConfig::default()).unwrap();
        assert_eq!(corpus.stats.rows_read, 3);
        assert_eq!(corpus.messages.len(), 3);
        assert_eq!(corpus.messages[1].subject, "Caf\u{fffd}");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = load_corpus(Path::new("/nonexistent/corpus.csv"), &AnalysisConfig::default());
        assert!(result.is_err());
    }
}
