//! Fetch/extract adapter: rate-gated HTTP fetch with bounded retry,
//! black-box extraction, and the article content verdict.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, TransportError};
use crate::limiter::HostGate;
use crate::traits::{ArticleSource, ContentExtractor, Transport};
use crate::types::Extracted;

/// Attempts per URL on transport-level failure.
pub const DEFAULT_ATTEMPTS: u32 = 2;

/// Minimum body length, in whitespace tokens, for a usable article.
pub const MIN_WORDS: usize = 150;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120 Safari/537.36";

/// Plain reqwest transport with a bounded per-request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: USER_AGENT.to_string(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout { url: url.to_string() }
                } else {
                    TransportError::Connect(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout { url: url.to_string() }
            } else {
                TransportError::Connect(Box::new(e))
            }
        })?;

        if body.is_empty() {
            return Err(TransportError::EmptyBody { url: url.to_string() });
        }

        Ok(body)
    }
}

/// Fetch-and-extract over any [`Transport`] and [`ContentExtractor`].
///
/// Per URL: resolve the host, take a [`HostGate`] permit before every
/// attempt (retries included), fetch with the transport, extract, and
/// apply the word-count verdict. Transport failures burn the retry
/// budget with `2^attempt` seconds of backoff between attempts; content
/// verdicts (unextractable, too short) are terminal on the first look.
pub struct ArticleFetcher<T, X> {
    transport: T,
    extractor: X,
    gate: Arc<HostGate>,
    attempts: u32,
    min_words: usize,
}

impl<T: Transport, X: ContentExtractor> ArticleFetcher<T, X> {
    pub fn new(transport: T, extractor: X, gate: Arc<HostGate>) -> Self {
        Self {
            transport,
            extractor,
            gate,
            attempts: DEFAULT_ATTEMPTS,
            min_words: MIN_WORDS,
        }
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    async fn fetch_with_retry(&self, url: &str, host: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 1;
        loop {
            self.gate.acquire(host).await;
            debug!(url, attempt, "fetching article");

            match self.transport.get_text(url).await {
                Ok(body) => return Ok(body),
                Err(e) if attempt < self.attempts => {
                    let backoff = Duration::from_secs(2u64.pow(attempt));
                    warn!(url, attempt, error = %e, backoff_secs = backoff.as_secs(), "fetch attempt failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(url, attempts = self.attempts, error = %e, "fetch failed, retries exhausted");
                    return Err(FetchError::Exhausted {
                        attempts: self.attempts,
                        source: e,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl<T: Transport, X: ContentExtractor> ArticleSource for ArticleFetcher<T, X> {
    async fn fetch_article(&self, url: &str) -> Result<Extracted, FetchError> {
        let host = Url::parse(url)
            .map_err(|_| FetchError::InvalidUrl { url: url.to_string() })?
            .host_str()
            .unwrap_or_default()
            .to_string();

        let raw = self.fetch_with_retry(url, &host).await?;

        let content = self
            .extractor
            .extract(&raw)
            .ok_or_else(|| FetchError::NoContent { url: url.to_string() })?;

        let word_count = content.body.split_whitespace().count();
        if word_count < self.min_words {
            debug!(url, words = word_count, "article too short");
            return Err(FetchError::TooShort {
                words: word_count,
                minimum: self.min_words,
            });
        }

        // Prefer metadata title, fall back to the first non-empty body
        // line, else empty. A missing title never fails the job.
        let title = content
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                content
                    .body
                    .lines()
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_default()
            .trim()
            .to_string();

        debug!(url, words = word_count, "article extracted");
        Ok(Extracted {
            title,
            content: content.body,
            word_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExtractor, MockTransport};

    fn fetcher(
        transport: MockTransport,
        extractor: MockExtractor,
    ) -> ArticleFetcher<MockTransport, MockExtractor> {
        // Tight gate so tests stay fast; spacing is covered in limiter.rs.
        ArticleFetcher::new(transport, extractor, Arc::new(HostGate::new(Duration::from_millis(1))))
    }

    fn long_body() -> String {
        vec!["word"; 200].join(" ")
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transport_failure_then_succeeds() {
        let transport = MockTransport::new()
            .fail_once(TransportError::Timeout { url: "http://a.test/x".into() })
            .then_body("<p>ok</p>");
        let extractor = MockExtractor::returning(None, &long_body());

        let out = fetcher(transport.clone(), extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap();

        assert_eq!(out.word_count, 200);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_on_persistent_failure() {
        let transport = MockTransport::new().always_fail();
        let extractor = MockExtractor::returning(None, &long_body());

        let err = fetcher(transport.clone(), extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn too_short_is_not_retried() {
        let transport = MockTransport::new().then_body("<p>short</p>");
        let extractor = MockExtractor::returning(None, "only a few words here");

        let err = fetcher(transport.clone(), extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::TooShort { words: 5, minimum: MIN_WORDS }));
        assert_eq!(transport.calls(), 1, "content verdicts must not burn retries");
    }

    #[tokio::test]
    async fn unextractable_payload_is_terminal() {
        let transport = MockTransport::new().then_body("<script>nothing()</script>");
        let extractor = MockExtractor::empty();

        let err = fetcher(transport.clone(), extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::NoContent { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn title_falls_back_to_first_body_line() {
        let body = format!("A Fine Headline\n{}", long_body());
        let transport = MockTransport::new().then_body("<p>x</p>");
        let extractor = MockExtractor::returning(None, &body);

        let out = fetcher(transport, extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap();

        assert_eq!(out.title, "A Fine Headline");
    }

    #[tokio::test]
    async fn metadata_title_wins_over_body() {
        let transport = MockTransport::new().then_body("<p>x</p>");
        let extractor = MockExtractor::returning(Some("Meta Title"), &long_body());

        let out = fetcher(transport, extractor)
            .fetch_article("http://a.test/x")
            .await
            .unwrap();

        assert_eq!(out.title, "Meta Title");
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_without_fetching() {
        let transport = MockTransport::new().then_body("<p>x</p>");
        let extractor = MockExtractor::returning(None, &long_body());

        let err = fetcher(transport.clone(), extractor)
            .fetch_article("not a url")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert_eq!(transport.calls(), 0);
    }
}
