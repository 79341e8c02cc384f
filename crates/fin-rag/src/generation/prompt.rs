//! Prompt templates for finance answers

use serde::Serialize;

use crate::config::OrchestratorConfig;
use crate::sources::aggregator::truncate_chars;
use crate::types::{AssembledContext, ChatMessage, Role};

const SYSTEM_INSTRUCTION: &str =
    "You are a finance assistant. Be factual and do not provide financial advice.";

const CLOSING_INSTRUCTIONS: &str = r#"## Instructions:
- Answer clearly and concisely, using the context provided above.
- When you use the knowledge base, market data or news, say so in your answer.
- End every answer with a 'Sources' section that lists exactly what you used:
  - Knowledge Base: [topic/file]
  - Market Data: [symbols]
  - News: [headlines]
- Do not provide financial advice.
- If you are not sure about something, say you don't know instead of guessing."#;

/// One role-tagged block of the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered prompt handed to the text-generation service.
///
/// The first message is always the system block; the rest is the bounded
/// conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromptPlan {
    pub messages: Vec<PromptMessage>,
}

impl PromptPlan {
    pub fn system(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Prompt builder for finance chat requests
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    history_turns: usize,
    history_chars: usize,
    news_headlines: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&OrchestratorConfig::default())
    }
}

impl PromptBuilder {
    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self {
            history_turns: config.history_turns,
            history_chars: config.history_chars,
            news_headlines: config.news_headlines,
        }
    }

    /// Build the full prompt: system block followed by the truncated history
    pub fn build(&self, ticker: Option<&str>, context: &AssembledContext, history: &[ChatMessage]) -> PromptPlan {
        let mut messages = Vec::with_capacity(self.history_turns.min(history.len()) + 1);
        messages.push(PromptMessage {
            role: Role::System,
            content: self.build_system_prompt(ticker, context),
        });

        let skip = history.len().saturating_sub(self.history_turns);
        messages.extend(history[skip..].iter().map(|m| PromptMessage {
            role: m.role,
            content: truncate_chars(&m.content, self.history_chars),
        }));

        PromptPlan { messages }
    }

    /// Build the system block with whatever context was gathered
    pub fn build_system_prompt(&self, ticker: Option<&str>, context: &AssembledContext) -> String {
        let mut prompt = String::from(SYSTEM_INSTRUCTION);
        prompt.push_str("\n\n");

        if let Some(ticker) = ticker {
            prompt.push_str(&format!(
                "The user is currently viewing information about {}. You can reference this ticker in your responses if relevant.\n\n",
                ticker
            ));
        }

        if !context.kb_snippets.is_empty() {
            prompt.push_str("## Knowledge Base Context:\n");
            for (i, snippet) in context.kb_snippets.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n\n", i + 1, snippet));
            }
        }

        if let Some(quotes) = &context.quotes {
            prompt.push_str("## Current Market Data:\n");
            for quote in quotes {
                let sign = if quote.change_pct >= 0.0 { "+" } else { "" };
                prompt.push_str(&format!(
                    "- {}: ${:.2} ({}{:.2}%)\n",
                    quote.symbol, quote.price, sign, quote.change_pct
                ));
            }
            prompt.push('\n');
        }

        if let Some(articles) = &context.news {
            prompt.push_str("## Recent News:\n");
            for (i, article) in articles.iter().take(self.news_headlines).enumerate() {
                prompt.push_str(&format!("{}. {} ({})\n", i + 1, article.title, article.source));
            }
            prompt.push('\n');
        }

        prompt.push_str(CLOSING_INSTRUCTIONS);
        prompt
    }
}
