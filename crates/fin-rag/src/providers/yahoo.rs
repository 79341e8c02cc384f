//! Yahoo Finance chart API quote source

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::MarketConfig;
use crate::error::{Error, Result};
use crate::sources::best_effort_all;
use crate::types::{normalize_symbols, Quote};

use super::market::QuoteProvider;
use super::sample_data::{sample_quote, sample_quotes};

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build a quote; change is 0 when there is no usable previous close
fn quote_from_prices(symbol: &str, price: f64, previous_close: Option<f64>) -> Quote {
    let change_pct = match previous_close {
        Some(prev) if prev != 0.0 => (price - prev) / prev * 100.0,
        _ => 0.0,
    };
    Quote::new(symbol, round2(price), round2(change_pct))
}

fn parse_chart(symbol: &str, body: &str) -> Result<Quote> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| Error::source_fetch("quotes", format!("{}: bad chart payload: {}", symbol, e)))?;

    let meta = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| Error::source_fetch("quotes", format!("{}: unexpected data structure", symbol)))?;

    let price = meta
        .regular_market_price
        .ok_or_else(|| Error::source_fetch("quotes", format!("{}: missing market price", symbol)))?;

    Ok(quote_from_prices(symbol, price, meta.previous_close))
}

/// Per-symbol chart lookups, fetched concurrently
pub struct YahooQuotes {
    client: Client,
    base_url: String,
    mock_fallback: bool,
    timeout: Duration,
}

impl YahooQuotes {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.yahoo_base_url.trim_end_matches('/').to_string(),
            mock_fallback: config.mock_fallback,
            timeout: Duration::from_secs(config.http_timeout_secs),
        })
    }

    async fn fetch_one(&self, symbol: &str) -> Result<Quote> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| Error::source_fetch("quotes", format!("{}: {}", symbol, e)))?;

        if !response.status().is_success() {
            return Err(Error::source_fetch(
                "quotes",
                format!("{}: HTTP {}", symbol, response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::source_fetch("quotes", format!("{}: {}", symbol, e)))?;

        parse_chart(symbol, &body)
    }
}

#[async_trait]
impl QuoteProvider for YahooQuotes {
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<Quote>> {
        let symbols = normalize_symbols(symbols);
        if symbols.is_empty() {
            return Err(Error::invalid_request("No valid symbols provided"));
        }

        let fetched = best_effort_all(
            "quotes",
            self.timeout,
            symbols.iter().map(|symbol| self.fetch_one(symbol)),
        )
        .await;

        let mut quotes = Vec::with_capacity(symbols.len());
        for (symbol, quote) in symbols.iter().zip(fetched) {
            match quote {
                Some(quote) => quotes.push(quote),
                None if self.mock_fallback => {
                    tracing::debug!("No live quote for {}, using sample data", symbol);
                    quotes.extend(sample_quote(symbol));
                }
                None => {}
            }
        }

        if quotes.is_empty() && self.mock_fallback {
            quotes = sample_quotes(&symbols);
        }
        if quotes.is_empty() {
            return Err(Error::source_fetch(
                "quotes",
                format!("no quotes available for {}", symbols.join(", ")),
            ));
        }

        Ok(quotes)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
