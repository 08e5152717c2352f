//! Chat wire protocol

use coven_core::{OrchestratorInput, SessionEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat request from client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessage {
    pub content: String,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub review_mode: Option<bool>,
}

impl From<ClientMessage> for OrchestratorInput {
    fn from(msg: ClientMessage) -> Self {
        let mut input = OrchestratorInput::new(msg.content);
        if let Some(persona) = msg.persona.filter(|p| !p.trim().is_empty()) {
            input = input.with_persona(persona);
        }
        if let Some(review) = msg.review_mode {
            input = input.with_review(review);
        }
        input
    }
}

/// Connection-level notices that are not part of a session
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    /// Connection established
    Connected { connection_id: Uuid },
    /// Request rejected before a session started
    Error { message: String, code: String },
}

/// Anything sent to the client
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Session(SessionEvent),
    Notice(Notice),
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, code: &str) -> Self {
        Self::Notice(Notice::Error {
            message: message.into(),
            code: code.to_string(),
        })
    }
}

impl From<SessionEvent> for ServerMessage {
    fn from(event: SessionEvent) -> Self {
        Self::Session(event)
    }
}
