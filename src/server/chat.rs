//! Chat endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use crate::types::{ChatRequest, ChatResponse};

use super::error::ApiError;
use super::AppState;

pub fn chat_routes() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat_handler))
}

/// Relay one exchange and return the thread's messages.
async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload?;
    let cancel = state.shutdown.child_token();
    let response = state.relay.relay_turn(request, &cancel).await?;
    Ok(Json(response))
}
