//! Quote and news source traits

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{NewsArticle, Quote};

/// Live quotes source.
///
/// May return fewer quotes than symbols requested; callers tolerate partial
/// results and outright failure.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>>;

    fn name(&self) -> &str;
}

/// News headlines source
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn get_news(&self, symbol: &str) -> Result<Vec<NewsArticle>>;

    fn name(&self) -> &str;
}
