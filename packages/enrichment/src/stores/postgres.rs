//! Postgres-backed document store.
//!
//! One table keyed uniquely on the document id. Writes are a single
//! upsert: every field except `created_at` takes the new value,
//! `updated_at` is stamped on overwrite. The uniqueness constraint on
//! `id` is the system's sole deduplication mechanism.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;

use crate::error::StoreError;
use crate::traits::{DocumentStore, SaveOutcome};
use crate::types::Document;

fn transient(e: sqlx::Error) -> StoreError {
    StoreError::Transient(Box::new(e))
}

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and make sure the articles table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(transient)?;

        ensure_table(&pool).await?;
        info!("connected to Postgres document store");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn ensure_table(pool: &PgPool) -> Result<(), StoreError> {
    // Safe to run on every boot.
    const SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS articles (
      id          text PRIMARY KEY,
      url         text NOT NULL,
      source      text NOT NULL,
      category    text NOT NULL,
      priority    int  NOT NULL,
      title       text NOT NULL,
      content     text NOT NULL,
      word_count  int  NOT NULL,
      summary     text,
      sentiment   text,
      keywords    jsonb NOT NULL DEFAULT '[]',
      created_at  timestamptz NOT NULL,
      updated_at  timestamptz
    );
    "#;

    sqlx::query(SQL).execute(pool).await.map_err(transient)?;
    Ok(())
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn save(&self, document: &Document) -> Result<SaveOutcome, StoreError> {
        // xmax = 0 distinguishes a fresh insert from a conflict update.
        const SQL: &str = r#"
        INSERT INTO articles
          (id, url, source, category, priority, title, content, word_count,
           summary, sentiment, keywords, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NULL)
        ON CONFLICT (id) DO UPDATE SET
          url        = EXCLUDED.url,
          source     = EXCLUDED.source,
          category   = EXCLUDED.category,
          priority   = EXCLUDED.priority,
          title      = EXCLUDED.title,
          content    = EXCLUDED.content,
          word_count = EXCLUDED.word_count,
          summary    = EXCLUDED.summary,
          sentiment  = EXCLUDED.sentiment,
          keywords   = EXCLUDED.keywords,
          updated_at = now()
        RETURNING (xmax = 0) AS inserted
        "#;

        let inserted: bool = sqlx::query_scalar(SQL)
            .bind(document.id.as_str())
            .bind(&document.url)
            .bind(&document.source)
            .bind(&document.category)
            .bind(i32::from(document.priority.get()))
            .bind(&document.title)
            .bind(&document.content)
            .bind(document.word_count as i32)
            .bind(document.summary.as_deref())
            .bind(document.sentiment.map(|s| s.as_str()))
            .bind(Json(&document.keywords))
            .bind(document.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(transient)?;

        if inserted {
            Ok(SaveOutcome::Inserted)
        } else {
            Ok(SaveOutcome::Updated)
        }
    }
}
