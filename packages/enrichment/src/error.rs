//! Typed errors for the enrichment pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the worker's
//! state machine can dispatch on outcomes instead of catching opaque
//! failures.

use thiserror::Error;

/// Transport-level failures from a single fetch attempt.
///
/// All variants are retryable; the fetcher applies the retry budget.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Connection-level failure (DNS, TLS, refused, reset)
    #[error("connection error: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// 2xx response with an empty payload
    #[error("empty response body from {url}")]
    EmptyBody { url: String },
}

/// Terminal failures from the fetch/extract adapter.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL did not parse; never retried
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Retry budget exhausted on transport failures
    #[error("fetch failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: TransportError,
    },

    /// Extractor produced nothing usable from the payload
    #[error("no article content extracted from {url}")]
    NoContent { url: String },

    /// Content verdict, not a transient failure; never retried
    #[error("article too short: {words} words (minimum {minimum})")]
    TooShort { words: usize, minimum: usize },
}

/// Failures from the queue broker.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Broker unreachable; infrastructure-level, retried with fixed backoff
    #[error("queue connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failures from the durable store.
///
/// Uniqueness conflicts are not errors; the store adapter resolves them
/// into a [`SaveOutcome`](crate::traits::SaveOutcome).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transient store failure; the job's raw payload is dead-lettered
    #[error("store error: {0}")]
    Transient(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why a raw payload failed validation before reaching the pipeline.
#[derive(Debug, Error)]
pub enum JobParseError {
    /// Payload was not a well-formed JSON object of the expected shape
    #[error("malformed job payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Parsed, but violates a field constraint
    #[error("invalid job: {reason}")]
    Invalid { reason: String },
}

/// Terminal per-job failure from the pipeline.
///
/// Any of these routes the original raw payload to the dead-letter
/// channel. Enrichment failures never appear here; they degrade inside
/// the enrichment adapter.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Job carried an empty URL
    #[error("job {id} has an empty url")]
    EmptyUrl { id: String },

    /// Fetch/extract gave up on the article
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
}
