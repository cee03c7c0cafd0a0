//! Subject-line normalization used to key reply threads.

use std::sync::LazyLock;

use regex::Regex;

/// Leading reply/forward marker, e.g. "re:", "fw:", "fwd:".
static REPLY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(re:|fw:|fwd:)\s*").expect("Invalid reply prefix regex"));

/// Normalize a subject line into a thread key.
///
/// The subject is trimmed and lower-cased, then leading reply/forward markers are
/// stripped repeatedly until none remain. Normalizing an already normalized subject
/// returns it unchanged.
///
/// # Examples
/// ```
/// use commgraph::utils::subject::normalize_subject;
///
/// assert_eq!(normalize_subject("Re: Re: Fwd: Hi"), "hi");
/// assert_eq!(normalize_subject("  Budget Review "), "budget review");
/// ```
pub fn normalize_subject(subject: &str) -> String {
    let mut current = subject.trim().to_lowercase();

    loop {
        let stripped = REPLY_PREFIX.replace(&current, "").trim().to_string();
        if stripped == current {
            return current;
        }
        current = stripped;
    }
}

/// Compute the thread key for a subject, honouring the threading switch.
///
/// With threading disabled every message shares the empty key, so replies are matched
/// purely on the participant pair.
pub fn thread_key(subject: &str, threading_enabled: bool) -> String {
    if threading_enabled {
        normalize_subject(subject)
    } else {
        String::new()
    }
}
