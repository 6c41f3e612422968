//! In-memory document store for testing and development.
//!
//! Mirrors the Postgres store's upsert contract: last write wins for
//! every field except `created_at`. Not durable. A transient failure can
//! be injected for dead-letter tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::traits::{DocumentStore, SaveOutcome};
use crate::types::Document;

#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Document>>,
    save_log: RwLock<Vec<String>>,
    fail_next: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<Document> {
        self.documents.read().unwrap().get(id).cloned()
    }

    /// Ids in the order `save` was called, duplicates included.
    pub fn save_log(&self) -> Vec<String> {
        self.save_log.read().unwrap().clone()
    }

    /// Make the next `save` call fail with a transient error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save(&self, document: &Document) -> Result<SaveOutcome, StoreError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Transient("injected store failure".into()));
        }

        self.save_log
            .write()
            .unwrap()
            .push(document.id.to_string());

        let mut documents = self.documents.write().unwrap();
        match documents.get(document.id.as_str()) {
            Some(existing) => {
                let mut updated = document.clone();
                updated.created_at = existing.created_at;
                updated.updated_at = Some(Utc::now());
                documents.insert(document.id.to_string(), updated);
                Ok(SaveOutcome::Updated)
            }
            None => {
                documents.insert(document.id.to_string(), document.clone());
                Ok(SaveOutcome::Inserted)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Enrichment, Extracted, Job};

    fn doc(id: u64, title: &str) -> Document {
        let job = Job::parse(&format!(
            r#"{{"id":{id},"url":"http://a.test/x","source":"s","category":"c","priority":2}}"#
        ))
        .unwrap();
        Document::assemble(
            &job,
            Extracted {
                title: title.to_string(),
                content: "body".to_string(),
                word_count: 1,
            },
            Enrichment::default(),
        )
    }

    #[tokio::test]
    async fn insert_then_update_preserves_created_at() {
        let store = MemoryStore::new();

        assert_eq!(store.save(&doc(1, "first")).await.unwrap(), SaveOutcome::Inserted);
        let first = store.get("1").unwrap();
        assert!(first.updated_at.is_none());

        assert_eq!(store.save(&doc(1, "second")).await.unwrap(), SaveOutcome::Updated);
        let second = store.get("1").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(second.title, "second", "last write wins");
        assert_eq!(second.created_at, first.created_at, "created_at is write-once");
        assert!(second.updated_at.is_some());
    }

    #[tokio::test]
    async fn injected_failure_is_transient() {
        let store = MemoryStore::new();
        store.fail_next();

        assert!(store.save(&doc(1, "t")).await.is_err());
        assert!(store.save(&doc(1, "t")).await.is_ok(), "only the next save fails");
    }
}
