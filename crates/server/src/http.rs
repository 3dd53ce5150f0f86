//! HTTP surface for the chat frontend.
//!
//! Endpoints:
//! - `GET  /`       — liveness payload
//! - `GET  /health` — static readiness marker
//! - `POST /chat`   — the single conversational endpoint
//!
//! Every handled failure is an HTTP 200 with a structured reply body; the
//! frontend branches on the body shape, not the status code.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use talentops_agent::{ChatDispatcher, ChatReply};
use talentops_core::identity::ChatRequest;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ChatDispatcher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "TalentOps backend is alive" }))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatReply> {
    Json(state.dispatcher.handle(&request).await)
}
