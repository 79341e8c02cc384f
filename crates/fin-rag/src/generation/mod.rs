//! Prompt assembly and the text-generation client

pub mod openai;
pub mod prompt;

pub use openai::OpenAiClient;
pub use prompt::{PromptBuilder, PromptMessage, PromptPlan};
