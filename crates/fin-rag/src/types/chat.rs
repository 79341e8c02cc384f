//! Chat request/response types exchanged with the UI layer

use serde::{Deserialize, Serialize};

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Chat request from the UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Ticker the user is currently viewing
    #[serde(default)]
    pub ticker: Option<String>,
    /// Full conversation, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            ticker: None,
            messages,
        }
    }

    pub fn with_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Content of the most recent user turn with non-blank text
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User && !m.content.trim().is_empty())
            .map(|m| m.content.as_str())
    }

    /// Ticker with surrounding whitespace removed, `None` when blank
    pub fn ticker(&self) -> Option<String> {
        self.ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
    }
}

/// Which source contributed a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Kb,
    Quotes,
    News,
}

/// Source citation returned alongside an answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub detail: String,
}

impl Citation {
    pub fn new(kind: SourceKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Chat response to the UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    /// Omitted when no source contributed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
}

impl ChatResponse {
    pub fn new(answer: String, citations: Vec<Citation>) -> Self {
        Self {
            answer,
            sources: if citations.is_empty() {
                None
            } else {
                Some(citations)
            },
        }
    }
}
