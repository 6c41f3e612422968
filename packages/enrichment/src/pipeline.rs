//! Per-job processing: validate, fetch/extract, enrich, assemble.
//!
//! The pipeline holds no cross-job state; it is a pure function of the
//! job and the two collaborators behind it. Enrichment is best-effort
//! and can never fail a job; fetch/extract failures are terminal and
//! surface as [`ProcessError`] for the worker to dead-letter.

use tracing::debug;

use crate::enrich::Enricher;
use crate::error::ProcessError;
use crate::traits::{AiClient, ArticleSource};
use crate::types::{Document, Job};

/// Composition of the fetch/extract adapter and the enrichment adapter.
pub struct Pipeline<F, A> {
    fetcher: F,
    enricher: Enricher<A>,
}

impl<F: ArticleSource, A: AiClient> Pipeline<F, A> {
    pub fn new(fetcher: F, enricher: Enricher<A>) -> Self {
        Self { fetcher, enricher }
    }

    /// Process one job into a storable document.
    pub async fn process(&self, job: &Job) -> Result<Document, ProcessError> {
        if job.url.trim().is_empty() {
            return Err(ProcessError::EmptyUrl {
                id: job.id.to_string(),
            });
        }

        let extracted = self
            .fetcher
            .fetch_article(&job.url)
            .await
            .map_err(|source| ProcessError::Fetch {
                url: job.url.clone(),
                source,
            })?;

        let enrichment = self
            .enricher
            .enrich(&extracted.title, &extracted.content)
            .await;

        debug!(id = %job.id, url = %job.url, words = extracted.word_count, "pipeline complete");
        Ok(Document::assemble(job, extracted, enrichment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::testing::{job_payload, MockAiClient, MockSource};
    use crate::types::{Job, Sentiment};

    fn job() -> Job {
        Job::parse(&job_payload(1, "http://a.test/x", 2)).unwrap()
    }

    #[tokio::test]
    async fn assembles_document_from_all_stages() {
        let fetcher = MockSource::article("Title", 200);
        let enricher = Enricher::new(MockAiClient::replying(
            r#"{"summary":"S","sentiment":"neutral","keywords":["a","b"]}"#,
        ));

        let doc = Pipeline::new(fetcher, enricher).process(&job()).await.unwrap();

        assert_eq!(doc.id.as_str(), "1");
        assert_eq!(doc.url, "http://a.test/x");
        assert_eq!(doc.title, "Title");
        assert_eq!(doc.word_count, 200);
        assert_eq!(doc.summary.as_deref(), Some("S"));
        assert_eq!(doc.sentiment, Some(Sentiment::Neutral));
        assert!(doc.updated_at.is_none());
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let fetcher = MockSource::failing(FetchError::TooShort { words: 10, minimum: 150 });
        let enricher = Enricher::new(MockAiClient::replying("{}"));

        let err = Pipeline::new(fetcher, enricher).process(&job()).await.unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Fetch { source: FetchError::TooShort { .. }, .. }
        ));
    }

    #[tokio::test]
    async fn enrichment_failure_still_produces_document() {
        let fetcher = MockSource::article("Title", 200);
        let enricher = Enricher::new(MockAiClient::failing());

        let doc = Pipeline::new(fetcher, enricher).process(&job()).await.unwrap();

        assert_eq!(doc.summary, None);
        assert_eq!(doc.sentiment, None);
        assert!(doc.keywords.is_empty());
    }

    #[tokio::test]
    async fn empty_url_is_rejected_before_fetch() {
        let fetcher = MockSource::article("Title", 200);
        let enricher = Enricher::new(MockAiClient::replying("{}"));
        let pipeline = Pipeline::new(fetcher, enricher);

        let mut j = job();
        j.url = "  ".to_string();

        let err = pipeline.process(&j).await.unwrap_err();
        assert!(matches!(err, ProcessError::EmptyUrl { .. }));
    }
}
