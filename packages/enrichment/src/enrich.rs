//! Enrichment adapter: best-effort AI summary/sentiment/keywords.
//!
//! The adapter sends a bounded excerpt to the [`AiClient`], strips any
//! code fences the model wrapped its output in, and parses the strict
//! JSON schema. Every failure mode (transport, non-JSON, schema
//! violation) degrades to [`Enrichment::default`]; enrichment never
//! fails a job.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::traits::AiClient;
use crate::types::Enrichment;

/// Characters of article content sent to the model, bounding cost.
pub const EXCERPT_CHARS: usize = 2000;

/// Adapter over any [`AiClient`].
pub struct Enricher<A> {
    client: A,
    excerpt_chars: usize,
}

impl<A: AiClient> Enricher<A> {
    pub fn new(client: A) -> Self {
        Self {
            client,
            excerpt_chars: EXCERPT_CHARS,
        }
    }

    pub fn with_excerpt_chars(mut self, chars: usize) -> Self {
        self.excerpt_chars = chars;
        self
    }

    /// Enrich an article. Infallible by contract; degraded results carry
    /// `{summary: None, sentiment: None, keywords: []}`.
    pub async fn enrich(&self, title: &str, content: &str) -> Enrichment {
        let excerpt: String = content.chars().take(self.excerpt_chars).collect();
        let prompt = build_prompt(title, &excerpt);

        let text = match self.client.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "AI call failed, using default enrichment");
                return Enrichment::default();
            }
        };

        match parse_response(&text) {
            Ok(enrichment) => {
                debug!(
                    sentiment = ?enrichment.sentiment,
                    keywords = enrichment.keywords.len(),
                    "article enriched"
                );
                enrichment
            }
            Err(e) => {
                warn!(error = %e, "unparseable AI response, using default enrichment");
                Enrichment::default()
            }
        }
    }
}

fn build_prompt(title: &str, excerpt: &str) -> String {
    format!(
        r#"You are an information extraction system analyzing a news article.

Respond with valid JSON only: no explanations, no markdown, no text
before or after the JSON object.

SCHEMA:
{{
  "summary": string,
  "sentiment": "positive" | "negative" | "neutral",
  "keywords": [string, string, string, string, string]
}}

The summary must be exactly 2 sentences. Sentiment reflects the overall
tone of the article. Keywords are 5 concrete terms from the article:
organizations, technologies, locations, people, or major concepts.

ARTICLE TITLE:
{title}

ARTICLE CONTENT:
{excerpt}"#
    )
}

/// Strip a surrounding fenced block (```json ... ```) if present.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse a model response into an [`Enrichment`], clamping keywords.
fn parse_response(text: &str) -> Result<Enrichment, serde_json::Error> {
    let enrichment: Enrichment = serde_json::from_str(strip_code_fences(text))?;
    Ok(enrichment.clamped())
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a compatible endpoint (Azure, proxies, local models).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AiClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("AI endpoint returned {status}: {body}").into());
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| "empty AI response".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAiClient;
    use crate::types::Sentiment;

    #[test]
    fn strips_fenced_json() {
        let fenced = "```json\n{\"summary\": \"S\"}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"summary\": \"S\"}");

        let bare = "{\"summary\": \"S\"}";
        assert_eq!(strip_code_fences(bare), bare);

        let no_lang = "```\n{}\n```";
        assert_eq!(strip_code_fences(no_lang), "{}");
    }

    #[test]
    fn parses_well_formed_response() {
        let e = parse_response(
            r#"{"summary":"Two sentences.","sentiment":"neutral","keywords":["a","b","c","d","e"]}"#,
        )
        .unwrap();
        assert_eq!(e.summary.as_deref(), Some("Two sentences."));
        assert_eq!(e.sentiment, Some(Sentiment::Neutral));
        assert_eq!(e.keywords.len(), 5);
    }

    #[test]
    fn parses_default_shape_with_nulls() {
        let e = parse_response(r#"{"summary":null,"sentiment":null,"keywords":[]}"#).unwrap();
        assert_eq!(e, Enrichment::default());
    }

    #[test]
    fn clamps_excess_keywords() {
        let e = parse_response(
            r#"{"summary":"S","sentiment":"positive","keywords":["1","2","3","4","5","6","7"]}"#,
        )
        .unwrap();
        assert_eq!(e.keywords.len(), 5);
    }

    #[test]
    fn schema_violation_is_an_error() {
        assert!(parse_response(r#"{"summary":"S","sentiment":"angry","keywords":[]}"#).is_err());
        assert!(parse_response("not json at all").is_err());
    }

    #[tokio::test]
    async fn client_failure_degrades_to_default() {
        let enricher = Enricher::new(MockAiClient::failing());
        let e = enricher.enrich("T", "content").await;
        assert_eq!(e, Enrichment::default());
    }

    #[tokio::test]
    async fn malformed_response_degrades_to_default() {
        let enricher = Enricher::new(MockAiClient::replying("the model rambles instead of JSON"));
        let e = enricher.enrich("T", "content").await;
        assert_eq!(e, Enrichment::default());
    }

    #[tokio::test]
    async fn fenced_response_still_parses() {
        let enricher = Enricher::new(MockAiClient::replying(
            "```json\n{\"summary\":\"S\",\"sentiment\":\"negative\",\"keywords\":[\"k\"]}\n```",
        ));
        let e = enricher.enrich("T", "content").await;
        assert_eq!(e.sentiment, Some(Sentiment::Negative));
        assert_eq!(e.keywords, vec!["k"]);
    }

    #[tokio::test]
    async fn prompt_is_bounded_by_excerpt() {
        let client = MockAiClient::replying(r#"{"summary":null,"sentiment":null,"keywords":[]}"#);
        let enricher = Enricher::new(client.clone()).with_excerpt_chars(10);
        enricher.enrich("T", &"x".repeat(10_000)).await;

        let prompts = client.prompts();
        assert_eq!(prompts.len(), 1);
        // Prompt scaffolding plus 10 chars of content, nowhere near 10k.
        assert!(prompts[0].len() < 1500, "excerpt not bounded: {}", prompts[0].len());
    }
}
