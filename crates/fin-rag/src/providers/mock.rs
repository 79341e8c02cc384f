//! Offline text generation with canned finance answers

use async_trait::async_trait;

use crate::error::Result;
use crate::generation::PromptPlan;

use super::llm::LlmProvider;

/// Canned answers keyed on phrases in the latest user turn, first match wins
const CANNED_ANSWERS: &[(&[&str], &str)] = &[
    (
        &["p/e", "price to earnings", "price-to-earnings"],
        "P/E ratio (Price-to-Earnings) is a valuation metric calculated by dividing a company's stock price by its earnings per share. It helps investors judge whether a stock looks expensive or cheap relative to its profits. Compare it against industry peers before drawing conclusions.",
    ),
    (
        &["etf", "exchange-traded fund"],
        "An ETF (Exchange-Traded Fund) is an investment fund that holds a basket of assets such as stocks, bonds or commodities. ETFs trade on exchanges like individual stocks, offering diversification and liquidity, usually with lower fees than mutual funds.",
    ),
    (
        &["market cap", "market capitalization"],
        "Market capitalization is the total value of a company's outstanding shares: the current share price multiplied by the number of shares. It is used to group companies into large-cap, mid-cap and small-cap.",
    ),
    (
        &["dividend"],
        "A dividend is a payment a company makes to its shareholders, usually out of profits. Dividends are typically paid quarterly and can provide a steady income stream.",
    ),
    (
        &["volatility"],
        "Volatility measures how much a price fluctuates over time. Higher volatility means larger swings, which signals higher risk and also the potential for higher returns.",
    ),
];

const DEFINITION_PHRASES: &[&str] = &["what is", "explain", "define"];

/// Text generation that never leaves the process
#[derive(Debug, Default, Clone)]
pub struct MockLlm;

impl MockLlm {
    pub fn new() -> Self {
        Self
    }

    pub fn answer_for(question: &str) -> String {
        let lower = question.to_lowercase();

        if let Some((_, answer)) = CANNED_ANSWERS
            .iter()
            .find(|(phrases, _)| phrases.iter().any(|p| lower.contains(p)))
        {
            return answer.to_string();
        }

        if DEFINITION_PHRASES.iter().any(|p| lower.contains(p)) {
            format!(
                "I understand you're asking about \"{}\". Mock mode is enabled, so no model was called. Configure an OpenAI API key for a complete answer.",
                question
            )
        } else {
            format!(
                "You asked: \"{}\". Mock mode is enabled, so no model was called. Try a finance concept such as \"What is P/E ratio?\" or \"Explain ETFs\" for a sample answer.",
                question
            )
        }
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn complete(&self, plan: &PromptPlan, _temperature: f32, _max_tokens: u32) -> Result<String> {
        Ok(Self::answer_for(plan.last_user_message().unwrap_or_default()))
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::PromptMessage;
    use crate::types::Role;

    #[test]
    fn test_canned_answers() {
        assert!(MockLlm::answer_for("What is P/E ratio?").starts_with("P/E ratio"));
        assert!(MockLlm::answer_for("Explain ETFs").starts_with("An ETF"));
        assert!(MockLlm::answer_for("how big is the market cap of AAPL").starts_with("Market capitalization"));
        assert!(MockLlm::answer_for("Dividend yield?").starts_with("A dividend"));
        assert!(MockLlm::answer_for("VOLATILITY").starts_with("Volatility"));
    }

    #[test]
    fn test_generic_answers_echo_question() {
        let definition = MockLlm::answer_for("What is a bond?");
        assert!(definition.starts_with("I understand you're asking about \"What is a bond?\""));

        let generic = MockLlm::answer_for("hello");
        assert!(generic.starts_with("You asked: \"hello\""));
    }

    #[tokio::test]
    async fn test_complete_uses_latest_user_turn() {
        let plan = PromptPlan {
            messages: vec![
                PromptMessage { role: Role::System, content: "system".into() },
                PromptMessage { role: Role::User, content: "Explain ETFs".into() },
                PromptMessage { role: Role::Assistant, content: "...".into() },
                PromptMessage { role: Role::User, content: "And dividends?".into() },
            ],
        };
        let answer = MockLlm::new().complete(&plan, 0.7, 500).await.unwrap();
        assert!(answer.starts_with("A dividend"));
    }
}
