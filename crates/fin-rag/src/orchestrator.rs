//! Request pipeline: validate, classify, gather, prompt, generate

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::FinRagConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::intent::classify;
use crate::providers::LlmProvider;
use crate::sources::SourceAggregator;
use crate::types::{ChatRequest, ChatResponse};

/// Answer used when the model returns no text
pub const FALLBACK_ANSWER: &str = "Sorry, I could not generate a response.";

/// Pipeline stage, recorded in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ClassifyIntent,
    GatherSources,
    BuildPrompt,
    Generate,
    Respond,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ClassifyIntent => "classify_intent",
            Stage::GatherSources => "gather_sources",
            Stage::BuildPrompt => "build_prompt",
            Stage::Generate => "generate",
            Stage::Respond => "respond",
        };
        f.write_str(name)
    }
}

/// Runs one chat request end to end
pub struct ChatOrchestrator {
    aggregator: Arc<SourceAggregator>,
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    temperature: f32,
    max_tokens: u32,
    source_timeout: Duration,
    deadline: Duration,
}

impl ChatOrchestrator {
    pub fn new(aggregator: Arc<SourceAggregator>, llm: Arc<dyn LlmProvider>, config: &FinRagConfig) -> Self {
        Self {
            aggregator,
            llm,
            prompts: PromptBuilder::from_config(&config.orchestrator),
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
            source_timeout: config.orchestrator.source_timeout(),
            deadline: config.orchestrator.request_deadline(),
        }
    }

    /// Override the overall request deadline
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn aggregator(&self) -> &Arc<SourceAggregator> {
        &self.aggregator
    }

    pub fn llm(&self) -> &Arc<dyn LlmProvider> {
        &self.llm
    }

    /// Most recent non-blank user turn, or `InvalidRequest`
    pub fn validate(request: &ChatRequest) -> Result<&str> {
        if request.messages.is_empty() {
            return Err(Error::invalid_request("Invalid messages array"));
        }
        request
            .latest_user_message()
            .ok_or_else(|| Error::invalid_request("Conversation has no user message"))
    }

    /// Answer a chat request
    pub async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let span = tracing::info_span!("chat", request_id = %Uuid::new_v4());
        async move {
            let started = Instant::now();
            let result = self.run(request, started).await;
            if let Err(e) = &result {
                let elapsed = started.elapsed().as_millis();
                if e.is_generation_failure() {
                    tracing::error!(kind = e.kind(), "Generation failed after {}ms: {}", elapsed, e);
                } else {
                    tracing::warn!(kind = e.kind(), "Request failed after {}ms: {}", elapsed, e);
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &ChatRequest, started: Instant) -> Result<ChatResponse> {
        let message = Self::validate(request)?;
        self.llm.ensure_configured()?;
        let ticker = request.ticker();

        let intent = classify(message);
        tracing::info!(stage = %Stage::ClassifyIntent, ?intent, "Intent detected");

        let remaining = self.deadline.saturating_sub(started.elapsed());
        let (context, citations) = self
            .aggregator
            .gather_within(intent, ticker.as_deref(), message, self.source_timeout.min(remaining))
            .await?;
        tracing::debug!(stage = %Stage::GatherSources, sources = citations.len(), "Sources gathered");

        let plan = self.prompts.build(ticker.as_deref(), &context, &request.messages);
        tracing::info!(
            stage = %Stage::BuildPrompt,
            "Starting request with {} messages, {} sources",
            plan.len(),
            citations.len()
        );

        let remaining = self.deadline.saturating_sub(started.elapsed());
        let answer = match tokio::time::timeout(
            remaining,
            self.llm.complete(&plan, self.temperature, self.max_tokens),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(stage = %Stage::Generate, "Generation exceeded the request deadline");
                return Err(Error::GenerationTimeout(format!(
                    "no response within {}ms",
                    self.deadline.as_millis()
                )));
            }
        };

        let answer = if answer.trim().is_empty() {
            FALLBACK_ANSWER.to_string()
        } else {
            answer
        };

        tracing::info!(
            stage = %Stage::Respond,
            "Request completed in {}ms",
            started.elapsed().as_millis()
        );

        Ok(ChatResponse::new(answer, citations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{CorpusStore, SnapshotFile};
    use crate::retrieval::VectorSearchEngine;
    use crate::sources::AggregatorSettings;
    use crate::testing::{
        article, snapshot_file, FakeEmbedder, FakeLlm, FakeNews, FakeQuotes, LlmBehavior,
    };
    use crate::types::{ChatMessage, Citation, Quote, SourceKind};

    struct Fixture {
        orchestrator: ChatOrchestrator,
        embedder: Arc<FakeEmbedder>,
        llm: Arc<FakeLlm>,
        quotes: Arc<FakeQuotes>,
        news: Arc<FakeNews>,
        _snapshot: Option<tempfile::NamedTempFile>,
    }

    fn kb_files() -> Vec<SnapshotFile> {
        vec![
            SnapshotFile {
                filename: "pe-ratio.md".into(),
                content: "P/E ratio compares share price to earnings per share.".into(),
                embedding: vec![1.0, 0.0],
            },
            SnapshotFile {
                filename: "etf.md".into(),
                content: "An ETF is a fund that trades like a stock.".into(),
                embedding: vec![0.0, 1.0],
            },
        ]
    }

    fn fixture_with(files: Option<Vec<SnapshotFile>>, llm: FakeLlm, quotes: FakeQuotes, news: FakeNews) -> Fixture {
        let snapshot = files.map(snapshot_file);
        let store = Arc::new(CorpusStore::new(
            snapshot
                .as_ref()
                .map(|s| s.path().to_path_buf())
                .unwrap_or_else(|| "/missing/kb_embeddings.json".into()),
        ));
        let embedder = Arc::new(FakeEmbedder::fixed(vec![1.0, 0.0]));
        let llm = Arc::new(llm);
        let quotes = Arc::new(quotes);
        let news = Arc::new(news);

        let search = Arc::new(VectorSearchEngine::new(store, embedder.clone(), 200));
        let aggregator = Arc::new(SourceAggregator::new(
            search,
            quotes.clone(),
            news.clone(),
            AggregatorSettings::default(),
        ));

        Fixture {
            orchestrator: ChatOrchestrator::new(aggregator, llm.clone(), &FinRagConfig::default()),
            embedder,
            llm,
            quotes,
            news,
            _snapshot: snapshot,
        }
    }

    fn fixture(llm: FakeLlm) -> Fixture {
        fixture_with(
            Some(kb_files()),
            llm,
            FakeQuotes::returning(vec![Quote::new("AAPL", 195.89, 1.23)]),
            FakeNews::returning(vec![article("Apple Reports Strong Q4 Earnings", "TechCrunch")]),
        )
    }

    fn ask(message: &str) -> ChatRequest {
        ChatRequest::new(vec![ChatMessage::user(message)])
    }

    fn assert_untouched(f: &Fixture) {
        assert_eq!(f.embedder.calls(), 0);
        assert_eq!(f.llm.calls(), 0);
        assert_eq!(f.quotes.calls(), 0);
        assert_eq!(f.news.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_messages_rejected_before_any_call() {
        let f = fixture(FakeLlm::answering("unused"));
        let result = f.orchestrator.handle(&ChatRequest::new(Vec::new())).await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_untouched(&f);
    }

    #[tokio::test]
    async fn test_no_user_turn_rejected() {
        let f = fixture(FakeLlm::answering("unused"));
        let request = ChatRequest::new(vec![ChatMessage::assistant("Hello!"), ChatMessage::user("   ")]);
        assert!(matches!(f.orchestrator.handle(&request).await, Err(Error::InvalidRequest(_))));
        assert_untouched(&f);
    }

    #[test]
    fn test_validate_skips_trailing_blank_turn() {
        let request = ChatRequest::new(vec![
            ChatMessage::user("What is P/E ratio?"),
            ChatMessage::user(" "),
        ]);
        assert_eq!(ChatOrchestrator::validate(&request).unwrap(), "What is P/E ratio?");
    }

    #[tokio::test]
    async fn test_unconfigured_generation_rejected_before_any_call() {
        let f = fixture(FakeLlm::new(LlmBehavior::Unconfigured));
        let result = f.orchestrator.handle(&ask("What is P/E ratio?")).await;
        assert!(matches!(result, Err(Error::Configuration(_))));
        assert_untouched(&f);
    }

    #[tokio::test]
    async fn test_definition_question() {
        let f = fixture(FakeLlm::answering("P/E is price over earnings."));
        let response = f.orchestrator.handle(&ask("What is P/E ratio?")).await.unwrap();

        assert_eq!(response.answer, "P/E is price over earnings.");
        let sources = response.sources.unwrap();
        assert_eq!(sources[0], Citation::new(SourceKind::Kb, "pe-ratio"));
        assert!(sources.iter().all(|c| c.kind == SourceKind::Kb));
        assert_eq!(f.quotes.calls(), 0);
        assert_eq!(f.news.calls(), 0);

        let plan = f.llm.last_plan().unwrap();
        let system = plan.system().unwrap();
        assert!(system.contains("## Knowledge Base Context:\n1. P/E ratio compares"));
        assert!(!system.contains("Current Market Data"));
        assert_eq!(plan.last_user_message(), Some("What is P/E ratio?"));
    }

    #[tokio::test]
    async fn test_quotes_failure_still_answers() {
        let f = fixture_with(
            Some(kb_files()),
            FakeLlm::answering("AAPL moved on earnings."),
            FakeQuotes::failing(),
            FakeNews::returning(vec![article("Apple Reports Strong Q4 Earnings", "TechCrunch")]),
        );
        let request = ask("What happened to AAPL today?").with_ticker("aapl");
        let response = f.orchestrator.handle(&request).await.unwrap();

        assert_eq!(response.answer, "AAPL moved on earnings.");
        assert_eq!(
            response.sources.unwrap(),
            vec![Citation::new(SourceKind::News, "Apple Reports Strong Q4 Earnings")]
        );
        assert_eq!(f.quotes.requested(), vec!["AAPL".to_string()]);
        assert_eq!(f.news.requested().as_deref(), Some("AAPL"));
        assert_eq!(f.embedder.calls(), 0);

        let system = f.llm.last_plan().unwrap().system().unwrap().to_string();
        assert!(system.contains("currently viewing information about AAPL"));
        assert!(!system.contains("Current Market Data"));
        assert!(system.contains("1. Apple Reports Strong Q4 Earnings (TechCrunch)"));
    }

    #[tokio::test]
    async fn test_generation_errors_propagate() {
        let f = fixture(FakeLlm::new(LlmBehavior::Fail(|| {
            Error::GenerationRateLimited("429".into())
        })));
        assert!(matches!(
            f.orchestrator.handle(&ask("What is P/E ratio?")).await,
            Err(Error::GenerationRateLimited(_))
        ));

        let f = fixture(FakeLlm::new(LlmBehavior::Fail(|| Error::GenerationAuth("401".into()))));
        assert!(matches!(
            f.orchestrator.handle(&ask("Explain ETFs")).await,
            Err(Error::GenerationAuth(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_answer_uses_fallback() {
        let f = fixture(FakeLlm::answering("  "));
        let response = f.orchestrator.handle(&ask("Explain ETFs")).await.unwrap();
        assert_eq!(response.answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_deadline_bounds_generation() {
        let mut f = fixture(FakeLlm::new(LlmBehavior::Hang));
        f.orchestrator = f.orchestrator.with_deadline(Duration::from_millis(100));

        let started = Instant::now();
        let result = f.orchestrator.handle(&ask("Explain ETFs")).await;
        assert!(matches!(result, Err(Error::GenerationTimeout(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_slow_source_does_not_block_past_deadline() {
        let mut f = fixture_with(
            Some(kb_files()),
            FakeLlm::answering("Markets are mixed."),
            FakeQuotes::returning(vec![Quote::new("SPY", 476.5, 0.34)]).with_delay(Duration::from_secs(30)),
            FakeNews::returning(Vec::new()),
        );
        f.orchestrator = f.orchestrator.with_deadline(Duration::from_millis(300));

        let started = Instant::now();
        let response = f.orchestrator.handle(&ask("current price of SPY")).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(response.answer, "Markets are mixed.");
        assert!(response.sources.is_none());
        assert_eq!(f.quotes.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_corpus_fails_kb_only_request() {
        let f = fixture_with(
            None,
            FakeLlm::answering("unused"),
            FakeQuotes::returning(Vec::new()),
            FakeNews::returning(Vec::new()),
        );
        assert!(matches!(
            f.orchestrator.handle(&ask("What is P/E ratio?")).await,
            Err(Error::CorpusNotFound(_))
        ));
        assert_eq!(f.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_sources_omitted_when_nothing_found() {
        let f = fixture_with(
            Some(Vec::new()),
            FakeLlm::answering("Hello there."),
            FakeQuotes::returning(Vec::new()),
            FakeNews::returning(Vec::new()),
        );
        let response = f.orchestrator.handle(&ask("hello")).await.unwrap();
        assert!(response.sources.is_none());
        assert_eq!(f.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_intent_uses_latest_user_turn() {
        let f = fixture(FakeLlm::answering("ok"));
        let request = ChatRequest::new(vec![
            ChatMessage::user("What happened to AAPL today?"),
            ChatMessage::assistant("It rose."),
            ChatMessage::user("What is P/E ratio?"),
        ]);
        f.orchestrator.handle(&request).await.unwrap();

        assert_eq!(f.quotes.calls(), 0);
        assert_eq!(f.embedder.calls(), 1);
        assert_eq!(f.llm.last_plan().unwrap().len(), 4);
    }
}
