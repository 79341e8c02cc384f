//! Best-effort fan-out: run independent fallible operations without letting
//! one failure sink the batch

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Run `operation` with a time limit; expiry becomes `Error::SourceFetch`
pub async fn time_boxed<T, F>(label: &'static str, limit: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(Error::source_fetch(
            label,
            format!("timed out after {}ms", limit.as_millis()),
        )),
    }
}

/// Run `operation` time-boxed, logging and discarding any failure
pub async fn best_effort<T, F>(label: &'static str, limit: Duration, operation: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match time_boxed(label, limit, operation).await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(source = label, error = %e, "Source failed, continuing without it");
            None
        }
    }
}

/// Run every operation concurrently; slot `i` holds the outcome of operation `i`
pub async fn best_effort_all<T, F, I>(label: &'static str, limit: Duration, operations: I) -> Vec<Option<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    futures::future::join_all(
        operations
            .into_iter()
            .map(|operation| best_effort(label, limit, operation)),
    )
    .await
}
