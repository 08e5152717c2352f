//! Per-request session state
//!
//! One `SessionState` lives for exactly one inbound request. The orchestrator
//! owns it and mutates it step by step; nothing else holds a reference.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reviewer verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Work accepted as is
    Approved,
    /// Work should be revised by the same persona
    NeedsWork,
    /// Work is rejected outright; no revision
    Rejected,
}

impl Verdict {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::NeedsWork => "needs_work",
            Self::Rejected => "rejected",
        }
    }

    /// Rating recorded in persona memory for this verdict
    #[must_use]
    pub fn rating(&self) -> f64 {
        match self {
            Self::Approved => 5.0,
            Self::NeedsWork => 3.0,
            Self::Rejected => 1.0,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Informational workflow phase reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No persona chosen yet
    #[default]
    Unclassified,
    /// A persona is producing work
    Working,
    /// The reviewer is judging work
    Reviewing,
    /// Terminal
    Complete,
}

/// Mutable state of one orchestrated request
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    /// Session identifier
    pub session_id: Uuid,
    request: String,
    /// Persona chosen by the caller or the classifier
    pub selected_persona: Option<String>,
    /// Latest worker text, overwritten by each revision
    pub work_output: Option<String>,
    /// Latest reviewer text
    pub review_feedback: Option<String>,
    /// Latest reviewer verdict
    pub review_verdict: Option<Verdict>,
    /// Completed review cycles
    pub iteration_count: u32,
    /// Current phase
    pub phase: Phase,
    /// Displayable text of the latest step
    pub response: Option<String>,
    /// Whether worker output goes to the reviewer
    pub review_mode: bool,
}

impl SessionState {
    /// Start a new session for `request`
    #[must_use]
    pub fn new(request: impl Into<String>, review_mode: bool) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            request: request.into(),
            selected_persona: None,
            work_output: None,
            review_feedback: None,
            review_verdict: None,
            iteration_count: 0,
            phase: Phase::Unclassified,
            response: None,
            review_mode,
        }
    }

    /// The original request; fixed for the whole session
    #[must_use]
    pub fn request(&self) -> &str {
        &self.request
    }

    /// Whether the next worker run is a revision of earlier work
    #[must_use]
    pub fn is_revision(&self) -> bool {
        self.iteration_count > 0 && self.review_feedback.is_some()
    }
}
