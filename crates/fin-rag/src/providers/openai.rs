//! OpenAI-backed providers for embeddings and chat completions
//!
//! Both providers can share one `OpenAiClient`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::generation::{OpenAiClient, PromptPlan};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Query embeddings via the OpenAI embeddings endpoint
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
}

impl OpenAiEmbedder {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(Arc::new(OpenAiClient::new(config)?)))
    }

    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// Answer generation via OpenAI chat completions
pub struct OpenAiLlm {
    client: Arc<OpenAiClient>,
}

impl OpenAiLlm {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        Ok(Self::from_client(Arc::new(OpenAiClient::new(config)?)))
    }

    pub fn from_client(client: Arc<OpenAiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn complete(&self, plan: &PromptPlan, temperature: f32, max_tokens: u32) -> Result<String> {
        self.client.chat(plan, temperature, max_tokens).await
    }

    fn ensure_configured(&self) -> Result<()> {
        self.client.ensure_configured()
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        self.client.generate_model()
    }
}
