//! Events emitted to the transport while a session runs

use crate::session::{Phase, SessionState, Verdict};
use serde::Serialize;
use uuid::Uuid;

/// Persona name reported before classification has picked one
pub const CLASSIFIER_NAME: &str = "classifier";

/// One session delta
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Work started
    Thinking {
        /// Session ID
        session_id: Uuid,
        /// Persona doing the first step
        persona: String,
        /// Status line
        message: String,
    },
    /// Intermediate persona or reviewer output
    Stream {
        /// Session ID
        session_id: Uuid,
        /// Persona that produced `content`
        persona: String,
        /// Output text
        content: String,
        /// Phase after the step
        phase: Phase,
        /// Completed review cycles
        iteration: u32,
        /// Latest verdict
        verdict: Option<Verdict>,
    },
    /// Final output; exactly one per successful session
    Complete {
        /// Session ID
        session_id: Uuid,
        /// Persona whose work this is
        persona: String,
        /// Final text
        content: String,
        /// Always `complete`
        phase: Phase,
        /// Completed review cycles
        iteration: u32,
        /// Final verdict
        verdict: Option<Verdict>,
    },
    /// Session aborted
    Error {
        /// Session ID
        session_id: Uuid,
        /// Human-readable reason
        message: String,
    },
}

impl SessionEvent {
    pub(crate) fn thinking(session_id: Uuid, persona: &str, display_name: &str) -> Self {
        Self::Thinking {
            session_id,
            persona: persona.to_string(),
            message: format!("{} is analyzing your request...", display_name),
        }
    }

    pub(crate) fn stream(persona: &str, state: &SessionState) -> Self {
        Self::Stream {
            session_id: state.session_id,
            persona: persona.to_string(),
            content: state.response.clone().unwrap_or_default(),
            phase: state.phase,
            iteration: state.iteration_count,
            verdict: state.review_verdict,
        }
    }

    pub(crate) fn complete(state: &SessionState) -> Self {
        Self::Complete {
            session_id: state.session_id,
            persona: state
                .selected_persona
                .clone()
                .unwrap_or_else(|| CLASSIFIER_NAME.to_string()),
            content: state.response.clone().unwrap_or_default(),
            phase: state.phase,
            iteration: state.iteration_count,
            verdict: state.review_verdict,
        }
    }

    pub(crate) fn error(session_id: Uuid, message: impl Into<String>) -> Self {
        Self::Error {
            session_id,
            message: message.into(),
        }
    }

    /// Whether this event ends the session
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }
}
