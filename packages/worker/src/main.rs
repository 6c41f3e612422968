//! Enrichment worker process: connects to the queue broker and the
//! document store, then runs dequeue loops until terminated.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use enrichment::{
    ArticleFetcher, Enricher, HostGate, HtmlExtractor, HttpTransport, OpenAiClient, Pipeline,
    PostgresStore, RedisQueue, Worker, BROKER_RETRY_DELAY,
};

mod config;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let queue = connect_queue(&config.redis_url).await;
    let store = Arc::new(connect_store(&config.database_url).await);
    let gate = Arc::new(HostGate::new(config.min_fetch_interval));

    let mut workers = Vec::with_capacity(config.concurrency);
    for _ in 0..config.concurrency {
        let fetcher = ArticleFetcher::new(
            HttpTransport::default(),
            HtmlExtractor::new(),
            Arc::clone(&gate),
        );

        let mut ai = OpenAiClient::new(&config.openai_api_key);
        if let Some(model) = &config.ai_model {
            ai = ai.with_model(model);
        }
        if let Some(base_url) = &config.ai_base_url {
            ai = ai.with_base_url(base_url);
        }

        let worker = Worker::new(
            queue.clone(),
            Arc::clone(&store),
            Pipeline::new(fetcher, Enricher::new(ai)),
        );
        workers.push(tokio::spawn(async move { worker.run().await }));
    }

    info!(workers = config.concurrency, "enrichment worker running");
    futures::future::join_all(workers).await;
    Ok(())
}

/// Block until the queue broker is reachable.
async fn connect_queue(url: &str) -> RedisQueue {
    loop {
        match RedisQueue::connect(url).await {
            Ok(queue) => return queue,
            Err(e) => {
                warn!(error = %e, delay_secs = BROKER_RETRY_DELAY.as_secs(), "Redis not available yet, retrying");
                tokio::time::sleep(BROKER_RETRY_DELAY).await;
            }
        }
    }
}

/// Block until the document store is reachable.
async fn connect_store(url: &str) -> PostgresStore {
    loop {
        match PostgresStore::connect(url).await {
            Ok(store) => return store,
            Err(e) => {
                warn!(error = %e, delay_secs = BROKER_RETRY_DELAY.as_secs(), "Postgres not available yet, retrying");
                tokio::time::sleep(BROKER_RETRY_DELAY).await;
            }
        }
    }
}
