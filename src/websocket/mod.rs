//! WebSocket module for Coven
//!
//! Provides real-time communication endpoints:
//! - /ws/chat - Interactive persona chat

pub mod chat;

pub use chat::chat_handler;

use axum::{routing::get, Router};

/// Create the WebSocket router
pub fn websocket_router() -> Router {
    Router::new().route("/ws/chat", get(chat_handler))
}
