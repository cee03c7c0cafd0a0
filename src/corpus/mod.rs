//! Corpus input: raw record types, header extraction, CSV reading and the record filter.

pub mod types;
pub mod extract;
pub mod filter;
pub mod reader;

pub use types::*;
pub use extract::extract_record;
pub use filter::RecordFilter;
pub use reader::{load_corpus, read_corpus, LoadedCorpus};
