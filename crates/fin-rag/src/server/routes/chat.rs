//! Chat endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// POST /api/chat - answer a finance question with citations
pub async fn chat(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>> {
    let Json(request) = payload.map_err(|e| Error::invalid_request(e.body_text()))?;
    let response = state.orchestrator().handle(&request).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::server::routes::test_support::{app, post_json, send};
    use crate::testing::{FakeLlm, LlmBehavior};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_chat_answer_with_sources() {
        let server = app(FakeLlm::answering("An ETF is an exchange-traded fund."));
        let (status, body) = send(
            &server.router,
            post_json("/api/chat", json!({"messages": [{"role": "user", "content": "Explain ETFs"}]})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "An ETF is an exchange-traded fund.");
        assert_eq!(body["sources"], json!([{"type": "kb", "detail": "etf"}]));
    }

    #[tokio::test]
    async fn test_market_question_uses_watchlist() {
        let server = app(FakeLlm::answering("Prices are up."));
        let (status, body) = send(
            &server.router,
            post_json(
                "/api/chat",
                json!({"ticker": null, "messages": [{"role": "user", "content": "current price?"}]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sources"], json!([{"type": "quotes", "detail": "AAPL"}]));
        assert_eq!(server.quotes.requested().len(), 7);
    }

    #[tokio::test]
    async fn test_sources_field_absent_when_empty() {
        let server = app(FakeLlm::answering("Hi"));
        std::fs::write(server.snapshot.path(), r#"{"files": []}"#).unwrap();

        let (status, body) = send(
            &server.router,
            post_json("/api/chat", json!({"messages": [{"role": "user", "content": "hello"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Hi");
        assert!(body.get("sources").is_none());
    }

    #[tokio::test]
    async fn test_error_responses() {
        let server = app(FakeLlm::answering("unused"));
        let (status, body) = send(&server.router, post_json("/api/chat", json!({"messages": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "invalid_request");
        assert_eq!(server.llm.calls(), 0);

        let (status, _) = send(&server.router, post_json("/api/chat", json!({"messages": "nope"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let server = app(FakeLlm::new(LlmBehavior::Unconfigured));
        let (status, body) = send(
            &server.router,
            post_json("/api/chat", json!({"messages": [{"role": "user", "content": "Explain ETFs"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["type"], "configuration_error");

        let server = app(FakeLlm::new(LlmBehavior::Fail(|| {
            Error::GenerationRateLimited("429".into())
        })));
        let (status, _) = send(
            &server.router,
            post_json("/api/chat", json!({"messages": [{"role": "user", "content": "Explain ETFs"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }
}
