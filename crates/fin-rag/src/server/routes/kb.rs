//! Knowledge base maintenance endpoint

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::server::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub documents: usize,
    pub dimensions: usize,
    pub generated_at: Option<String>,
    pub loaded_at: String,
}

/// POST /api/kb/reload - drop the cached snapshot and read it again
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    let store = Arc::clone(state.corpus());
    let corpus = tokio::task::spawn_blocking(move || {
        store.invalidate();
        store.load()
    })
    .await
    .map_err(|e| Error::internal(format!("Task join error: {}", e)))??;

    Ok(Json(ReloadResponse {
        documents: corpus.len(),
        dimensions: corpus.dimensions(),
        generated_at: corpus.generated_at().map(str::to_string),
        loaded_at: corpus.loaded_at().to_rfc3339(),
    }))
}
