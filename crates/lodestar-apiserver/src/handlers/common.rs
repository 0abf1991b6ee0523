use crate::{ApiError, Result};
use axum::body::Body;
use axum::http::Uri;
use bytes::Bytes;
use lodestar_core::LodestarError;
use tokio_util::sync::CancellationToken;

/// GET /
pub async fn index() -> &'static str {
    "Welcome!\n"
}

/// Health check endpoint
pub async fn healthz() -> &'static str {
    "ok"
}

/// Liveness check
pub async fn livez() -> &'static str {
    "ok"
}

/// Readiness check
pub async fn readyz() -> &'static str {
    "ok"
}

/// Anything not routed
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("no route for {}", uri.path()))
}

/// Buffer a request body of at most `limit` bytes.
///
/// Failures are reported as invalid requests so each endpoint can answer in
/// its own error shape instead of a bare 413.
pub async fn read_body(body: Body, limit: usize) -> lodestar_core::Result<Bytes> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        LodestarError::invalid_request(
            format!("cannot read request body: {}", e),
            format!("Request bodies are limited to {} bytes (--max-body-bytes)", limit),
        )
    })
}

/// Run an evaluation on the blocking pool under a request-scoped token.
///
/// The token is cancelled when the returned future is dropped, which is what
/// happens to a handler whose client has gone away, so the evaluation stops
/// at its next node boundary instead of running to completion.
pub async fn evaluate<T, F>(evaluation: F) -> Result<T>
where
    F: FnOnce(&CancellationToken) -> T + Send + 'static,
    T: Send + 'static,
{
    let token = CancellationToken::new();
    let _cancel_on_drop = token.clone().drop_guard();

    let output = tokio::task::spawn_blocking(move || evaluation(&token)).await?;

    Ok(output)
}
