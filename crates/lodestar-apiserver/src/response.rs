use crate::Result;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::debug;

/// Encode `body` as a 200 JSON response.
///
/// Encoding is done up front so a value that cannot be serialized becomes a
/// 500 for this request instead of a panic in the response writer.
pub fn json_response<T: Serialize>(label: &str, body: &T) -> Result<Response> {
    let encoded = lodestar_core::to_json_vec(body)?;

    debug!("{}: {}", label, String::from_utf8_lossy(&encoded));

    Ok(([(header::CONTENT_TYPE, "application/json")], encoded).into_response())
}
