//! API routes

pub mod chat;
pub mod kb;
pub mod market;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/quotes", get(market::quotes))
        .route("/news", get(market::news))
        .route("/kb/reload", post(kb::reload))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.config();
    let llm = state.orchestrator().llm();
    Json(serde_json::json!({
        "name": "fin-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Finance Q&A grounded in a knowledge base, live quotes and news",
        "generation": {
            "provider": llm.name(),
            "model": llm.model(),
        },
        "corpus": {
            "path": config.corpus.snapshot_path.display().to_string(),
            "loaded": state.corpus().is_loaded(),
        },
        "endpoints": {
            "POST /api/chat": "Answer a finance question with source citations",
            "GET /api/quotes?symbols=A,B": "Latest quotes",
            "GET /api/news?ticker=X": "Recent headlines",
            "POST /api/kb/reload": "Reload the knowledge base snapshot",
            "GET /health": "Liveness check"
        }
    }))
}


#[cfg(test)]
mod tests {
    use super::test_support::{app, get, send};
    use crate::testing::FakeLlm;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_and_info() {
        let server = app(FakeLlm::answering("ok"));

        let (status, body) = send(&server.router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");

        let (status, body) = send(&server.router, get("/api/info")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "fin-rag");
        assert_eq!(body["generation"]["model"], "fake-model");
    }
}
