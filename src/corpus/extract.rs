//! Header extraction from raw message text.
//!
//! Pulls the Subject, From, To and Date headers plus the body out of an unparsed
//! message blob using fixed patterns. No MIME handling is attempted.

use std::sync::LazyLock;

use regex::Regex;

use super::types::*;

/// Compiled regex patterns for header extraction
pub struct HeaderPatterns {
    /// Match: "Subject: <text>" up to end of line
    pub subject: Regex,
    /// Match: "From: <address>"
    pub from: Regex,
    /// Match: "To: <list>" possibly folded over several lines, ending before "Subject:"
    pub to: Regex,
    /// Match: "Date: <text>" up to end of line
    pub date: Regex,
}

impl HeaderPatterns {
    pub fn new() -> Self {
        Self {
            subject: Regex::new(r"Subject:[ \t]*(.*)\r?\n").expect("Invalid subject regex"),
            from: Regex::new(r"From:\s*([^\s]+@[^\s]+)").expect("Invalid from regex"),
            to: Regex::new(r"(?s)To:\s*(.*?)\nSubject:").expect("Invalid to regex"),
            date: Regex::new(r"Date:[ \t]*(.*)\r?\n").expect("Invalid date regex"),
        }
    }
}

impl Default for HeaderPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// Global patterns instance
pub static PATTERNS: LazyLock<HeaderPatterns> = LazyLock::new(HeaderPatterns::new);

/// Extract a raw record from an unparsed message.
///
/// Returns `MissingHeader` when From, To or Date cannot be found; a missing subject
/// is treated as empty.
pub fn extract_record(raw_message: &str) -> Result<RawRecord, RejectReason> {
    let subject = PATTERNS
        .subject
        .captures(raw_message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let body = raw_message
        .split_once("\n\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();

    let sender = capture(&PATTERNS.from, raw_message).ok_or(RejectReason::MissingHeader)?;
    let receivers = capture(&PATTERNS.to, raw_message).ok_or(RejectReason::MissingHeader)?;
    let date = capture(&PATTERNS.date, raw_message).ok_or(RejectReason::MissingHeader)?;

    Ok(RawRecord {
        sender,
        receivers,
        subject,
        date: date.trim().to_string(),
        body,
    })
}

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
