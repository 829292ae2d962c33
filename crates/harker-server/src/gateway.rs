//! Inbound event gateway.
//!
//! The webhook handler validates the path secret, hands the update to
//! an independent task, and acknowledges immediately; it never waits
//! on the completion call or reply delivery.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use harker_engine::StoryEngine;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::telegram::{deliver, ReplyTransport, Update};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<StoryEngine>,
    pub transport: Arc<dyn ReplyTransport>,
    pub secret: Arc<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/{secret}", post(webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn webhook(
    Path(secret): Path<String>,
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Response {
    if secret != *state.secret {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    // Process in the background so the front end gets its ack now.
    tokio::spawn(process_update(state, update));
    Json(json!({ "ok": true })).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn process_update(state: AppState, update: Update) {
    let Some(message) = update.message else {
        debug!(update.update_id, "update carried no message; skipping");
        return;
    };
    let Some(text) = message.text else {
        return;
    };
    let chat_id = message.chat.id;

    state.transport.typing(chat_id).await;

    let Some(reply) = state.engine.handle_turn(chat_id, &text).await else {
        return;
    };
    if let Err(e) = deliver(state.transport.as_ref(), chat_id, &reply).await {
        error!("giving up on reply to chat {chat_id}: {e}");
    }
}
