//! Keyword-based intent classification of user messages

use serde::Serialize;

/// Information needs detected in a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentFlags {
    /// Definition/explanation question, answered from the knowledge base
    pub needs_definition: bool,
    /// Live quotes wanted
    pub needs_quotes: bool,
    /// Recent news wanted (always implies `needs_quotes`)
    pub needs_news: bool,
}

impl IntentFlags {
    /// True when the knowledge base is the only requested source
    pub fn is_kb_only(&self) -> bool {
        self.needs_definition && !self.needs_quotes && !self.needs_news
    }
}

/// Signal raised by a keyword group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Market,
    News,
    Definition,
}

/// Keyword groups, matched as case-insensitive substrings
const KEYWORD_TABLE: &[(Signal, &[&str])] = &[
    (
        Signal::Market,
        &["price", "today", "move", "why", "news", "happened", "change", "trading", "current"],
    ),
    (Signal::News, &["news", "happened", "announcement", "update"]),
    (
        Signal::Definition,
        &["explain", "what is", "define", "how does", "what are", "tell me about"],
    ),
];

fn raised(lower: &str, signal: Signal) -> bool {
    KEYWORD_TABLE
        .iter()
        .filter(|(s, _)| *s == signal)
        .any(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
}

/// Classify a message into information needs.
///
/// Any news keyword also requests quotes. A message with no market or news
/// keyword at all is treated as a definition question.
pub fn classify(message: &str) -> IntentFlags {
    let lower = message.to_lowercase();

    let market = raised(&lower, Signal::Market);
    let news = raised(&lower, Signal::News);
    let definition = raised(&lower, Signal::Definition);

    IntentFlags {
        needs_definition: definition || !(market || news),
        needs_quotes: market || news,
        needs_news: news,
    }
}
