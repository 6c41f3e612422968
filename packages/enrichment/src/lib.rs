//! Priority-queue article enrichment pipeline.
//!
//! A worker dequeues URL jobs from five priority channels, fetches and
//! extracts the article text, enriches it with a best-effort AI call,
//! and upserts the result exactly once per job id. Jobs that cannot be
//! completed land on a dead-letter channel in their original wire form
//! for manual replay.
//!
//! # Design
//!
//! - Explicit outcome types at every adapter boundary; the worker's
//!   state machine dispatches on values, never on caught panics.
//! - Collaborators (transport, extraction, AI, queue, store) live behind
//!   traits, constructed at startup and injected, so each is
//!   substitutable with the fakes in [`testing`].
//! - Enrichment is additive: any AI failure degrades to an empty
//!   [`Enrichment`](types::Enrichment), never a failed job.
//! - The store's uniqueness constraint on the job id is the only
//!   deduplication mechanism; writes are last-write-wins upserts with a
//!   write-once `created_at`.
//!
//! # Modules
//!
//! - [`types`] - jobs on the wire, documents in the store
//! - [`traits`] - collaborator seams
//! - [`limiter`] - per-host fetch spacing
//! - [`extract`] / [`fetch`] - extraction and the retrying fetcher
//! - [`enrich`] - the AI adapter
//! - [`pipeline`] / [`worker`] - per-job processing and the dequeue loop
//! - [`queues`] / [`stores`] - Redis/Postgres backends plus in-memory doubles
//! - [`testing`] - mock collaborators

pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod limiter;
pub mod pipeline;
pub mod queues;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod worker;

pub use enrich::{Enricher, OpenAiClient, EXCERPT_CHARS};
pub use error::{
    FetchError, JobParseError, ProcessError, QueueError, StoreError, TransportError,
};
pub use extract::HtmlExtractor;
pub use fetch::{ArticleFetcher, HttpTransport, DEFAULT_ATTEMPTS, MIN_WORDS};
pub use limiter::{HostGate, DEFAULT_MIN_INTERVAL};
pub use pipeline::Pipeline;
pub use queues::{MemoryQueue, RedisQueue};
pub use stores::{MemoryStore, PostgresStore};
pub use traits::{
    AiClient, ArticleSource, ContentExtractor, DocumentStore, ExtractedContent, JobQueue,
    SaveOutcome, Transport,
};
pub use types::{Document, Enrichment, Extracted, Job, JobId, Priority, Sentiment};
pub use worker::{DeadLetterReason, TickOutcome, Worker, BROKER_RETRY_DELAY};
