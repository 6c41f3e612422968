//! The priority-queue worker loop.
//!
//! Per job: dequeue, validate, process, store, with every terminal
//! failure routing the *original raw payload* to the dead-letter channel
//! so a later replay re-runs the full pipeline. Per-job errors are
//! contained here; only broker connectivity loss escapes a tick, and the
//! loop answers that with a fixed backoff and an indefinite retry.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::QueueError;
use crate::pipeline::Pipeline;
use crate::traits::{AiClient, ArticleSource, DocumentStore, JobQueue, SaveOutcome};
use crate::types::Job;

/// Fixed delay between reconnect attempts after broker connection loss.
pub const BROKER_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Terminal outcome of one dequeue-process-store cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Document written (first insert or idempotent overwrite).
    Stored(SaveOutcome),
    /// Raw payload routed to the dead-letter channel.
    DeadLettered(DeadLetterReason),
}

/// Why a payload was dead-lettered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadLetterReason {
    /// Not parseable, missing required fields, or invalid priority.
    Malformed,
    /// Pipeline gave up on the job (fetch/extract failure).
    ProcessingFailed,
    /// Document was built but the store reported a transient error.
    StoreFailed,
}

/// One worker instance. Multiple workers may run in parallel; the only
/// shared mutable state between them is the rate limiter inside the
/// pipeline's fetcher.
pub struct Worker<Q, S, F, A> {
    queue: Q,
    store: S,
    pipeline: Pipeline<F, A>,
}

impl<Q, S, F, A> Worker<Q, S, F, A>
where
    Q: JobQueue,
    S: DocumentStore,
    F: ArticleSource,
    A: AiClient,
{
    pub fn new(queue: Q, store: S, pipeline: Pipeline<F, A>) -> Self {
        Self {
            queue,
            store,
            pipeline,
        }
    }

    /// Run the dequeue loop forever.
    pub async fn run(&self) {
        info!("worker started, waiting for jobs");
        loop {
            if let Err(QueueError::Connection(e)) = self.tick().await {
                warn!(error = %e, delay_secs = BROKER_RETRY_DELAY.as_secs(), "lost queue connection, retrying");
                tokio::time::sleep(BROKER_RETRY_DELAY).await;
            }
        }
    }

    /// One cycle: block for the next job and run it to a terminal state.
    ///
    /// Errors only on broker-level failure; every per-job failure is
    /// resolved into a [`TickOutcome`].
    pub async fn tick(&self) -> Result<TickOutcome, QueueError> {
        let raw = self.queue.dequeue().await?;
        self.handle(&raw).await
    }

    async fn handle(&self, raw: &str) -> Result<TickOutcome, QueueError> {
        let job = match Job::parse(raw) {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "invalid payload, dead-lettering");
                self.queue.dead_letter(raw).await?;
                return Ok(TickOutcome::DeadLettered(DeadLetterReason::Malformed));
            }
        };

        let document = match self.pipeline.process(&job).await {
            Ok(document) => document,
            Err(e) => {
                warn!(id = %job.id, url = %job.url, error = %e, "processing failed, dead-lettering");
                self.queue.dead_letter(raw).await?;
                return Ok(TickOutcome::DeadLettered(DeadLetterReason::ProcessingFailed));
            }
        };

        match self.store.save(&document).await {
            Ok(outcome) => {
                info!(id = %job.id, url = %job.url, outcome = ?outcome, "document stored");
                Ok(TickOutcome::Stored(outcome))
            }
            Err(e) => {
                // Dead-letter the raw payload, not the built document, so
                // replay re-runs the idempotent pipeline from scratch.
                warn!(id = %job.id, url = %job.url, error = %e, "store failed, dead-lettering");
                self.queue.dead_letter(raw).await?;
                Ok(TickOutcome::DeadLettered(DeadLetterReason::StoreFailed))
            }
        }
    }
}
