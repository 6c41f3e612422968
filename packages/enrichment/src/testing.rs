//! Mock collaborators for testing without network or AI calls.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;

use crate::error::{FetchError, TransportError};
use crate::traits::{AiClient, ArticleSource, ContentExtractor, ExtractedContent, Transport};
use crate::types::Extracted;

/// Well-formed job payload in the wire shape.
pub fn job_payload(id: u64, url: &str, priority: u8) -> String {
    format!(
        r#"{{"id":{id},"url":"{url}","source":"s","category":"c","priority":{priority}}}"#
    )
}

/// Scripted [`Transport`]: queued one-shot results, then a repeatable
/// body; `always_fail` times out every call.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<TransportState>,
}

#[derive(Default)]
struct TransportState {
    script: Mutex<VecDeque<Result<String, TransportError>>>,
    body: Mutex<Option<String>>,
    always_fail: AtomicBool,
    calls: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single failure, consumed by the next call.
    pub fn fail_once(self, error: TransportError) -> Self {
        self.inner.script.lock().unwrap().push_back(Err(error));
        self
    }

    /// Body returned once the script is drained.
    pub fn then_body(self, body: impl Into<String>) -> Self {
        *self.inner.body.lock().unwrap() = Some(body.into());
        self
    }

    /// Time out on every call.
    pub fn always_fail(self) -> Self {
        self.inner.always_fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        if self.inner.always_fail.load(Ordering::SeqCst) {
            return Err(TransportError::Timeout { url: url.to_string() });
        }
        if let Some(scripted) = self.inner.script.lock().unwrap().pop_front() {
            return scripted;
        }
        match self.inner.body.lock().unwrap().clone() {
            Some(body) => Ok(body),
            None => panic!("MockTransport script exhausted for {url}"),
        }
    }
}

/// [`ContentExtractor`] that ignores its input and returns what it was
/// configured with.
pub struct MockExtractor {
    result: Option<ExtractedContent>,
}

impl MockExtractor {
    /// Always extract the given title and body.
    pub fn returning(title: Option<&str>, body: &str) -> Self {
        Self {
            result: Some(ExtractedContent {
                title: title.map(str::to_string),
                body: body.to_string(),
            }),
        }
    }

    /// Never extract anything.
    pub fn empty() -> Self {
        Self { result: None }
    }
}

impl ContentExtractor for MockExtractor {
    fn extract(&self, _raw_html: &str) -> Option<ExtractedContent> {
        self.result.clone()
    }
}

/// Scripted [`ArticleSource`], bypassing transport and extraction.
#[derive(Clone)]
pub struct MockSource {
    inner: Arc<SourceState>,
}

struct SourceState {
    article: Option<Extracted>,
    // One-shot; a scripted failure is consumed by the first call.
    error: Mutex<Option<FetchError>>,
    calls: AtomicUsize,
}

impl MockSource {
    /// Always yield an article with this title and word count.
    pub fn article(title: &str, words: usize) -> Self {
        Self {
            inner: Arc::new(SourceState {
                article: Some(Extracted {
                    title: title.to_string(),
                    content: vec!["word"; words].join(" "),
                    word_count: words,
                }),
                error: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    /// Fail the next fetch with this error.
    pub fn failing(error: FetchError) -> Self {
        Self {
            inner: Arc::new(SourceState {
                article: None,
                error: Mutex::new(Some(error)),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleSource for MockSource {
    async fn fetch_article(&self, url: &str) -> Result<Extracted, FetchError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.inner.error.lock().unwrap().take() {
            return Err(error);
        }
        match &self.inner.article {
            Some(article) => Ok(article.clone()),
            None => panic!("MockSource failure already consumed for {url}"),
        }
    }
}

/// Scripted [`AiClient`] with prompt capture.
#[derive(Clone)]
pub struct MockAiClient {
    reply: Option<String>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockAiClient {
    /// Reply with the same completion text to every prompt.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fail every call (collaborator down).
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for MockAiClient {
    async fn complete(
        &self,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        self.prompts.write().unwrap().push(prompt.to_string());
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err("AI collaborator unavailable".into()),
        }
    }
}
