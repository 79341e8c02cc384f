//! Error types for the finance RAG engine

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Engine errors
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed credentials/settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Empty or malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Corpus snapshot file is absent
    #[error("Embeddings file not found: {}. Run the embedding generation job first.", .0.display())]
    CorpusNotFound(PathBuf),

    /// Corpus snapshot could not be parsed or failed a structural check
    #[error("Corrupt corpus snapshot: {0}")]
    CorpusCorrupt(String),

    /// Embedding call failed or the service is unconfigured
    #[error("Embedding service unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Two vectors with different dimensionality were compared
    #[error("Vector dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Quotes or news source failed
    #[error("Failed to fetch {source_name}: {message}")]
    SourceFetch {
        source_name: &'static str,
        message: String,
    },

    /// Text generation exceeded its deadline
    #[error("Request timed out: {0}")]
    GenerationTimeout(String),

    /// Text generation rejected the credentials
    #[error("Invalid API key: {0}")]
    GenerationAuth(String),

    /// Text generation was rate limited
    #[error("Rate limit exceeded: {0}")]
    GenerationRateLimited(String),

    /// Text generation failed at the transport level
    #[error("Generation service error: {0}")]
    GenerationTransport(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a source fetch error
    pub fn source_fetch(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::SourceFetch {
            source_name,
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(message.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for the corpus load failures
    pub fn is_corpus_unavailable(&self) -> bool {
        matches!(self, Error::CorpusNotFound(_) | Error::CorpusCorrupt(_))
    }

    /// True for failures of the final text-generation call
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Error::GenerationTimeout(_)
                | Error::GenerationAuth(_)
                | Error::GenerationRateLimited(_)
                | Error::GenerationTransport(_)
        )
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::CorpusNotFound(_) => "corpus_not_found",
            Error::CorpusCorrupt(_) => "corpus_corrupt",
            Error::EmbeddingUnavailable(_) => "embedding_unavailable",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::SourceFetch { .. } => "source_fetch_failed",
            Error::GenerationTimeout(_) => "generation_timeout",
            Error::GenerationAuth(_) => "generation_auth_error",
            Error::GenerationRateLimited(_) => "generation_rate_limited",
            Error::GenerationTransport(_) => "generation_transport_error",
            Error::Io(_) => "io_error",
            Error::Json(_) => "json_error",
            Error::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::GenerationAuth(_) => StatusCode::UNAUTHORIZED,
            Error::GenerationRateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::GenerationTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::GenerationTransport(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::EmbeddingUnavailable(_)
            | Error::DimensionMismatch { .. }
            | Error::SourceFetch { .. } => StatusCode::BAD_GATEWAY,
            Error::Configuration(_)
            | Error::CorpusNotFound(_)
            | Error::CorpusCorrupt(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "type": self.kind(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
