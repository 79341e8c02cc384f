//! In-memory fakes for the provider traits, shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;

use crate::corpus::{CorpusSnapshot, SnapshotFile};
use crate::error::{Error, Result};
use crate::generation::PromptPlan;
use crate::providers::{EmbeddingProvider, LlmProvider, NewsProvider, QuoteProvider};
use crate::types::{NewsArticle, Quote};

/// Write a snapshot to a temp file that lives as long as the returned handle
pub fn snapshot_file(files: Vec<SnapshotFile>) -> NamedTempFile {
    let snapshot = CorpusSnapshot {
        files,
        generated_at: Some("2024-01-01T00:00:00Z".to_string()),
    };
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string(&snapshot).unwrap().as_bytes())
        .unwrap();
    file
}

pub struct FakeEmbedder {
    vector: Option<Vec<f32>>,
    calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn fixed(vector: Vec<f32>) -> Self {
        Self {
            vector: Some(vector),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            vector: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vector
            .clone()
            .ok_or_else(|| Error::embedding("simulated embedding outage"))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub enum LlmBehavior {
    Answer(String),
    Fail(fn() -> Error),
    Unconfigured,
    Hang,
}

pub struct FakeLlm {
    behavior: LlmBehavior,
    calls: AtomicUsize,
    last_plan: Mutex<Option<PromptPlan>>,
}

impl FakeLlm {
    pub fn new(behavior: LlmBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_plan: Mutex::new(None),
        }
    }

    pub fn answering(answer: &str) -> Self {
        Self::new(LlmBehavior::Answer(answer.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_plan(&self) -> Option<PromptPlan> {
        self.last_plan.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for FakeLlm {
    async fn complete(&self, plan: &PromptPlan, _temperature: f32, _max_tokens: u32) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_plan.lock() = Some(plan.clone());
        match &self.behavior {
            LlmBehavior::Answer(answer) => Ok(answer.clone()),
            LlmBehavior::Fail(make) => Err(make()),
            LlmBehavior::Unconfigured => Err(Error::Configuration("no key".into())),
            LlmBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }

    fn ensure_configured(&self) -> Result<()> {
        match self.behavior {
            LlmBehavior::Unconfigured => Err(Error::Configuration("OpenAI API key not configured".into())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

pub struct FakeQuotes {
    quotes: Option<Vec<Quote>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl FakeQuotes {
    pub fn returning(quotes: Vec<Quote>) -> Self {
        Self {
            quotes: Some(quotes),
            delay: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            quotes: None,
            delay: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl QuoteProvider for FakeQuotes {
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock() = symbols.to_vec();
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.quotes
            .clone()
            .ok_or_else(|| Error::source_fetch("quotes", "simulated network error"))
    }

    fn name(&self) -> &str {
        "fake-quotes"
    }
}

pub struct FakeNews {
    articles: Option<Vec<NewsArticle>>,
    calls: AtomicUsize,
    requested: Mutex<Option<String>>,
}

impl FakeNews {
    pub fn returning(articles: Vec<NewsArticle>) -> Self {
        Self {
            articles: Some(articles),
            calls: AtomicUsize::new(0),
            requested: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Option<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl NewsProvider for FakeNews {
    async fn get_news(&self, symbol: &str) -> Result<Vec<NewsArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.requested.lock() = Some(symbol.to_string());
        self.articles
            .clone()
            .ok_or_else(|| Error::source_fetch("news", "simulated network error"))
    }

    fn name(&self) -> &str {
        "fake-news"
    }
}

pub fn article(title: &str, source: &str) -> NewsArticle {
    NewsArticle {
        title: title.to_string(),
        source: source.to_string(),
        published_at: "2024-01-01T00:00:00Z".to_string(),
        url: "https://example.com".to_string(),
    }
}
