//! Shared utilities: subject normalization and date parsing.

pub mod datetime;
pub mod subject;

pub use datetime::{hours_between, parse_datetime, parse_datetime_local};
pub use subject::{normalize_subject, thread_key};
