//! Quotes and news endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::providers::news::MAX_NEWS_ITEMS;
use crate::server::state::AppState;
use crate::types::{normalize_symbols, NewsResponse, QuotesResponse};

#[derive(Debug, Deserialize)]
pub struct QuotesParams {
    pub symbols: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub ticker: Option<String>,
}

/// GET /api/quotes?symbols=AAPL,MSFT
pub async fn quotes(
    State(state): State<AppState>,
    Query(params): Query<QuotesParams>,
) -> Result<Json<QuotesResponse>> {
    let raw = params
        .symbols
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_request("Missing symbols parameter"))?;

    let symbols = normalize_symbols(raw.split(','));
    if symbols.is_empty() {
        return Err(Error::invalid_request("No valid symbols provided"));
    }

    let quotes = state.quotes().get_quotes(&symbols).await?;

    Ok(Json(QuotesResponse {
        as_of: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        quotes,
    }))
}

/// GET /api/news?ticker=AAPL
pub async fn news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>> {
    let ticker = params
        .ticker
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::invalid_request("Missing ticker parameter"))?;

    let mut items = state.news().get_news(&ticker).await?;
    items.truncate(MAX_NEWS_ITEMS);

    Ok(Json(NewsResponse { ticker, items }))
}
