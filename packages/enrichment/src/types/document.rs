//! The enriched, durable record derived from a [`Job`](crate::types::Job).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::job::{Job, JobId, Priority};

/// Readable article content derived from a raw fetched payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Resolved title; empty when neither metadata nor body offered one.
    pub title: String,
    pub content: String,
    /// Whitespace-token count of `content`.
    pub word_count: usize,
}

/// Overall tone of an article as judged by the AI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Best-effort AI output. Every field may be absent; enrichment failure
/// degrades to [`Enrichment::default`] and never fails a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,
    /// At most 5, possibly empty.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Maximum number of keywords kept from the AI response.
pub const MAX_KEYWORDS: usize = 5;

impl Enrichment {
    /// Clamp to the schema: at most [`MAX_KEYWORDS`] keywords.
    pub fn clamped(mut self) -> Self {
        self.keywords.truncate(MAX_KEYWORDS);
        self
    }
}

/// The durable record: job identity, extracted article, AI enrichment.
///
/// Written whole or not at all; `id` carries the uniqueness constraint in
/// the store. `created_at` is set once on first insert, `updated_at` on
/// every overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: JobId,
    pub url: String,
    pub source: String,
    pub category: String,
    pub priority: Priority,

    pub title: String,
    pub content: String,
    pub word_count: usize,

    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub keywords: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Assemble a document from the pipeline's three inputs.
    pub fn assemble(job: &Job, extracted: Extracted, enrichment: Enrichment) -> Self {
        Self {
            id: job.id.clone(),
            url: job.url.clone(),
            source: job.source.clone(),
            category: job.category.clone(),
            priority: job.priority,
            title: extracted.title,
            content: extracted.content,
            word_count: extracted.word_count,
            summary: enrichment.summary,
            sentiment: enrichment.sentiment,
            keywords: enrichment.keywords,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_round_trips_lowercase() {
        assert_eq!(
            serde_json::from_str::<Sentiment>("\"neutral\"").unwrap(),
            Sentiment::Neutral
        );
        assert_eq!(serde_json::to_string(&Sentiment::Positive).unwrap(), "\"positive\"");
    }

    #[test]
    fn enrichment_clamps_keywords() {
        let e = Enrichment {
            summary: None,
            sentiment: None,
            keywords: (0..8).map(|i| format!("k{i}")).collect(),
        };
        assert_eq!(e.clamped().keywords.len(), MAX_KEYWORDS);
    }

    #[test]
    fn enrichment_default_is_all_absent() {
        let e = Enrichment::default();
        assert!(e.summary.is_none());
        assert!(e.sentiment.is_none());
        assert!(e.keywords.is_empty());
    }
}
