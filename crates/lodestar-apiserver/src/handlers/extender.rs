use crate::handlers::common::{evaluate, read_body};
use crate::protocol::{self, ExtensionRequest};
use crate::response::json_response;
use crate::{AppState, Result};
use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use lodestar_scheduler::SchedulerError;
use std::sync::Arc;
use tracing::warn;

async fn decode(state: &AppState, body: Body) -> lodestar_core::Result<ExtensionRequest> {
    let bytes = read_body(body, state.max_body_bytes).await?;
    protocol::decode_request(&bytes)
}

/// GET|POST {prefix}/filter
pub async fn filter(State(state): State<Arc<AppState>>, body: Body) -> Result<Response> {
    let result = match decode(&state, body).await {
        Ok(ExtensionRequest { context, source }) => {
            let extender = state.extender.clone();
            match evaluate(move |cancel| extender.filter(&context, cancel)).await? {
                Ok(outcome) => protocol::filter_result(outcome, source),
                Err(SchedulerError::Cancelled) => return Err(SchedulerError::Cancelled.into()),
                Err(e) => {
                    warn!("Filter evaluation failed: {}", e);
                    protocol::filter_error(e)
                }
            }
        }
        Err(e) => {
            warn!("Failed to decode filter request: {}", e);
            protocol::filter_error(e)
        }
    };

    json_response("Filter", &result)
}

/// GET|POST {prefix}/prioritize
pub async fn prioritize(State(state): State<Arc<AppState>>, body: Body) -> Result<Response> {
    let list = match decode(&state, body).await {
        Ok(ExtensionRequest { context, .. }) => {
            let extender = state.extender.clone();
            let scores = evaluate(move |cancel| extender.prioritize(&context, cancel)).await??;
            protocol::host_priorities(&scores)
        }
        Err(e) => {
            warn!("Failed to decode prioritize request: {}", e);
            protocol::prioritize_error()
        }
    };

    json_response("Prioritize", &list)
}
