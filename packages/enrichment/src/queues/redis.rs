//! Redis-backed priority channels.
//!
//! The five inbound lists are `articles:priority:1` through
//! `articles:priority:5`; `BRPOP` with the keys in that order gives a
//! blocking pop with the low-to-high priority bias and per-list FIFO.
//! Dead letters append to `articles:failed`.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::error::QueueError;
use crate::traits::JobQueue;
use crate::types::Priority;

const KEY_PREFIX: &str = "articles";

fn connection_err(e: redis::RedisError) -> QueueError {
    QueueError::Connection(Box::new(e))
}

/// Queue client over one Redis connection manager.
///
/// `ConnectionManager` reconnects on its own; a dequeue that fails while
/// the broker is down still surfaces as [`QueueError::Connection`] so the
/// worker can apply its fixed backoff.
#[derive(Clone)]
pub struct RedisQueue {
    conn: ConnectionManager,
    priority_keys: Vec<String>,
    failed_key: String,
}

impl RedisQueue {
    /// Connect to the broker at `url`.
    pub async fn connect(url: &str) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(connection_err)?;
        let conn = ConnectionManager::new(client).await.map_err(connection_err)?;
        info!(url, "connected to Redis queue");

        Ok(Self {
            conn,
            priority_keys: Priority::levels()
                .map(|p| format!("{KEY_PREFIX}:priority:{p}"))
                .collect(),
            failed_key: format!("{KEY_PREFIX}:failed"),
        })
    }
}

#[async_trait]
impl JobQueue for RedisQueue {
    async fn dequeue(&self) -> Result<String, QueueError> {
        let mut conn = self.conn.clone();

        // Timeout 0 blocks until a payload arrives on any list; BRPOP
        // checks the keys in listed order, so priority 1 wins.
        let popped: Option<(String, String)> = conn
            .brpop(&self.priority_keys, 0.0)
            .await
            .map_err(connection_err)?;

        match popped {
            Some((list, raw)) => {
                debug!(list, "dequeued job");
                Ok(raw)
            }
            // BRPOP with timeout 0 only yields nil on broken protocol state.
            None => Err(QueueError::Connection("BRPOP returned nil".into())),
        }
    }

    async fn dead_letter(&self, raw: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(&self.failed_key, raw)
            .await
            .map_err(connection_err)
    }
}
