//! Domain types: jobs on the wire, documents in the store.

pub mod document;
pub mod job;

pub use document::{Document, Enrichment, Extracted, Sentiment, MAX_KEYWORDS};
pub use job::{Job, JobId, Priority};
