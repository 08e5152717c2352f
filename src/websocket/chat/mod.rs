//! Chat WebSocket module

pub mod handlers;
pub mod protocol;
pub mod session;

use axum::{extract::ws::WebSocketUpgrade, response::IntoResponse, Extension};
use coven_core::Orchestrator;
use std::sync::Arc;

/// WebSocket upgrade handler
pub async fn chat_handler(
    ws: WebSocketUpgrade,
    Extension(orchestrator): Extension<Arc<Orchestrator>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session::handle_socket(socket, orchestrator))
}
