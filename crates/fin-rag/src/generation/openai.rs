//! OpenAI-compatible HTTP client for embeddings and chat completions

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::prompt::{PromptMessage, PromptPlan};

const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Embeddings request body
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A failed attempt and whether it is worth repeating
#[derive(Debug)]
struct Failure {
    error: Error,
    transient: bool,
}

impl Failure {
    fn permanent(error: Error) -> Self {
        Self { error, transient: false }
    }

    fn transient(error: Error) -> Self {
        Self { error, transient: true }
    }
}

/// Run `operation` up to `max_retries + 1` times, backing off exponentially.
/// Only transient failures are retried.
async fn retry_with_backoff<F, Fut, T>(max_retries: u32, base_delay: Duration, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, Failure>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(failure) if failure.transient && attempt < max_retries => {
                let delay = base_delay * 2u32.pow(attempt);
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {}",
                    attempt + 1,
                    max_retries + 1,
                    delay,
                    failure.error
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(failure) => return Err(failure.error),
        }
    }
}

/// Classify a non-success HTTP status from the completion endpoint
fn status_failure(status: StatusCode, body: &str) -> Failure {
    let detail = format!("HTTP {}: {}", status, body.chars().take(200).collect::<String>());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Failure::permanent(Error::GenerationAuth(detail)),
        StatusCode::TOO_MANY_REQUESTS => Failure::permanent(Error::GenerationRateLimited(detail)),
        s if s.is_server_error() => Failure::transient(Error::GenerationTransport(detail)),
        _ => Failure::permanent(Error::GenerationTransport(detail)),
    }
}

fn send_failure(e: reqwest::Error) -> Failure {
    if e.is_timeout() {
        Failure::transient(Error::GenerationTimeout(e.to_string()))
    } else {
        Failure::transient(Error::GenerationTransport(e.to_string()))
    }
}

/// Client for an OpenAI-compatible API
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    embed_model: String,
    generate_model: String,
    timeout: Duration,
    embed_timeout: Duration,
    max_retries: u32,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            embed_model: config.embed_model.clone(),
            generate_model: config.generate_model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            embed_timeout: Duration::from_secs(config.embed_timeout_secs),
            max_retries: config.max_retries,
        })
    }

    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    pub fn generate_model(&self) -> &str {
        &self.generate_model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn ensure_configured(&self) -> Result<()> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(Error::Configuration("OpenAI API key not configured".into()))
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration("OpenAI API key not configured".into()))
    }

    /// Embed one text. Every failure surfaces as `EmbeddingUnavailable`.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self.api_key().map_err(|e| Error::embedding(e.to_string()))?;
        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.embed_timeout)
            .json(&EmbedRequest {
                model: &self.embed_model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "Embedding failed: HTTP {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::embedding("Embedding response contained no vector"))
    }

    /// Run a chat completion. Returns the first choice's text, possibly empty.
    pub async fn chat(&self, plan: &PromptPlan, temperature: f32, max_tokens: u32) -> Result<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);

        tracing::info!(
            "Generating answer with model: {} ({} messages)",
            self.generate_model,
            plan.len()
        );

        retry_with_backoff(self.max_retries, BACKOFF_BASE, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .timeout(self.timeout)
                .json(&ChatRequest {
                    model: &self.generate_model,
                    messages: &plan.messages,
                    temperature,
                    max_tokens,
                })
                .send()
                .await
                .map_err(send_failure)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_failure(status, &body));
            }

            let body: ChatResponse = response.json().await.map_err(|e| {
                Failure::permanent(Error::GenerationTransport(format!(
                    "Failed to parse completion response: {}",
                    e
                )))
            })?;

            Ok(body
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default())
        })
        .await
    }
}
