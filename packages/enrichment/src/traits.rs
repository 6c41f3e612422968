//! Trait seams for the external collaborators.
//!
//! Every dependency the worker touches over a network sits behind one of
//! these traits so it can be constructed at startup, injected, and
//! substituted with the fakes in [`testing`](crate::testing).

use async_trait::async_trait;

use crate::error::{FetchError, QueueError, StoreError, TransportError};
use crate::types::{Document, Extracted};

/// Raw HTTP transport for article pages.
///
/// One call is one attempt; retry policy lives in the
/// [`ArticleFetcher`](crate::fetch::ArticleFetcher) above it.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the body of `url` as text.
    async fn get_text(&self, url: &str) -> Result<String, TransportError>;
}

/// Black-box boilerplate removal: raw payload in, readable article out.
///
/// Returns `None` when the payload holds no usable article. The title is
/// metadata-derived and may be absent; the fetcher applies the fallback
/// chain and the word-count verdict.
pub trait ContentExtractor: Send + Sync {
    fn extract(&self, raw_html: &str) -> Option<ExtractedContent>;
}

/// Extractor output before title resolution.
#[derive(Debug, Clone, Default)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub body: String,
}

/// Fetch-and-extract adapter: the pipeline's view of the network.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch `url`, strip boilerplate, and apply the content verdict.
    async fn fetch_article(&self, url: &str) -> Result<Extracted, FetchError>;
}

/// AI collaborator: prompt in, raw completion text out.
///
/// Implementations wrap a specific LLM provider; parsing and degradation
/// live in the [`Enricher`](crate::enrich::Enricher) adapter above this.
#[async_trait]
pub trait AiClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// The inbound priority channels plus the dead-letter channel.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Block until a job is available on any priority channel.
    ///
    /// Returns the raw payload from the lowest-numbered non-empty channel;
    /// within one channel, strict FIFO. Only broker-level failures error.
    async fn dequeue(&self) -> Result<String, QueueError>;

    /// Append a raw payload, verbatim, to the dead-letter channel.
    async fn dead_letter(&self, raw: &str) -> Result<(), QueueError>;
}

/// Result of an idempotent document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// First write for this id; `created_at` was set.
    Inserted,
    /// The id already existed; all fields except `created_at` were
    /// overwritten (last write wins) and `updated_at` was set.
    Updated,
}

/// Durable store with a uniqueness constraint on the document id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Upsert a document. Processing the same id twice never produces two
    /// records; a transient failure is an error, never silent.
    async fn save(&self, document: &Document) -> Result<SaveOutcome, StoreError>;
}

// Shared handles work wherever the trait is expected.

#[async_trait]
impl<T: JobQueue + ?Sized> JobQueue for std::sync::Arc<T> {
    async fn dequeue(&self) -> Result<String, QueueError> {
        (**self).dequeue().await
    }

    async fn dead_letter(&self, raw: &str) -> Result<(), QueueError> {
        (**self).dead_letter(raw).await
    }
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for std::sync::Arc<T> {
    async fn save(&self, document: &Document) -> Result<SaveOutcome, StoreError> {
        (**self).save(document).await
    }
}
