//! LLM provider trait for the final text-generation call

use async_trait::async_trait;
use crate::error::Result;
use crate::generation::PromptPlan;

/// Trait for chat-completion style text generation
///
/// Implementations:
/// - `OpenAiLlm`: OpenAI chat completions (gpt-4o-mini)
/// - `MockLlm`: canned answers for offline development
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for the prompt plan.
    ///
    /// Errors are one of `GenerationTimeout`, `GenerationAuth`,
    /// `GenerationRateLimited` or `GenerationTransport`.
    async fn complete(&self, plan: &PromptPlan, temperature: f32, max_tokens: u32) -> Result<String>;

    /// Fail with `Error::Configuration` when the provider cannot be called at all
    fn ensure_configured(&self) -> Result<()> {
        Ok(())
    }

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
