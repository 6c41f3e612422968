use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub database_url: String,
    pub openai_api_key: String,
    pub ai_model: Option<String>,
    pub ai_base_url: Option<String>,
    /// Minimum spacing between fetches to the same host.
    pub min_fetch_interval: Duration,
    /// Worker tasks in this process.
    pub concurrency: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let interval_secs: f64 = env::var("MIN_FETCH_INTERVAL_SECS")
            .unwrap_or_else(|_| "2.0".to_string())
            .parse()
            .context("MIN_FETCH_INTERVAL_SECS must be a number of seconds")?;

        Ok(Self {
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            ai_model: env::var("AI_MODEL").ok(),
            ai_base_url: env::var("AI_BASE_URL").ok(),
            min_fetch_interval: Duration::from_secs_f64(interval_secs),
            concurrency: env::var("WORKER_CONCURRENCY")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .context("WORKER_CONCURRENCY must be a positive integer")?,
        })
    }
}
