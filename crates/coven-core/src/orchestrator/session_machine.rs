//! Incremental driver for the review-loop state machine

use super::core::Orchestrator;
use super::events::SessionEvent;
use super::machine::{transition, Effect, Event, Node, TransitionContext};
use crate::error::{Error, Result};
use crate::executor::StepOutcome;
use crate::memory::Interaction;
use crate::session::{SessionState, Verdict};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One session being driven through the machine
///
/// Each [`step`](Self::step) performs exactly one transition, applies its
/// effects, runs the work of the node it lands on and returns the resulting
/// delta. Callers forward the delta before stepping again.
pub struct SessionMachine<'a> {
    orchestrator: &'a Orchestrator,
    state: SessionState,
    node: Node,
    pending: Option<Event>,
}

impl<'a> SessionMachine<'a> {
    pub(crate) fn new(
        orchestrator: &'a Orchestrator,
        state: SessionState,
        preselected: Option<String>,
    ) -> Self {
        Self {
            orchestrator,
            state,
            node: Node::Entry,
            pending: Some(Event::Start { preselected }),
        }
    }

    /// Current session state
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Consume the machine, returning the session state
    #[must_use]
    pub fn into_state(self) -> SessionState {
        self.state
    }

    /// Current node
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Explicit persona the session will start with, before the first step
    pub(crate) fn pending_persona(&self) -> Option<&String> {
        match &self.pending {
            Some(Event::Start { preselected }) => preselected.as_ref(),
            _ => None,
        }
    }

    /// Whether the machine reached `Terminal`
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.node == Node::Terminal
    }

    /// Advance by one transition
    ///
    /// Returns the delta to emit, or `None` for steps with nothing to show
    /// (classification).
    ///
    /// # Errors
    /// - `Internal` when stepped after completion
    /// - `Llm(Cancelled)` when `cancel` fired during the step
    pub async fn step(&mut self, cancel: &CancellationToken) -> Result<Option<SessionEvent>> {
        let event = self
            .pending
            .take()
            .ok_or_else(|| Error::Internal("session already complete".to_string()))?;

        let selected = self.state.selected_persona.clone();
        let ctx = TransitionContext {
            selected_persona: selected.as_deref(),
            persona_is_worker: self.selected_is_worker(),
            review_enabled: self.review_enabled(),
            iteration_count: self.state.iteration_count,
            max_iterations: self.orchestrator.config().max_iterations,
        };
        let transition = transition(&self.node, &event, &ctx)?;

        debug!(
            session = %self.state.session_id,
            from = ?self.node,
            to = ?transition.next,
            event = ?event,
            "Transition"
        );

        self.node = transition.next;
        for effect in transition.effects {
            self.apply(effect);
        }

        let delta = match self.node.clone() {
            Node::Entry => {
                return Err(Error::Internal("transition back to entry".to_string()));
            }
            Node::Classifying => {
                let persona = self
                    .orchestrator
                    .classifier()
                    .classify(self.state.request(), cancel)
                    .await;
                self.pending = Some(Event::Classified(persona));
                None
            }
            Node::Persona(id) => {
                let outcome = self
                    .orchestrator
                    .executor()
                    .run_persona(&id, &mut self.state, cancel)
                    .await?;
                self.pending = Some(Event::WorkDone(outcome));
                Some(SessionEvent::stream(&id, &self.state))
            }
            Node::Reviewing => {
                let outcome = self
                    .orchestrator
                    .executor()
                    .run_reviewer(&mut self.state, cancel)
                    .await?;
                let verdict = match outcome {
                    StepOutcome::Succeeded => self.state.review_verdict,
                    StepOutcome::Failed => None,
                };
                self.pending = Some(Event::Reviewed(verdict));
                let reviewer = self
                    .orchestrator
                    .registry()
                    .reviewer()
                    .map_or("reviewer", |r| r.id());
                Some(SessionEvent::stream(reviewer, &self.state))
            }
            Node::Terminal => Some(SessionEvent::complete(&self.state)),
        };

        if cancel.is_cancelled() {
            return Err(Error::Llm(coven_llm::Error::Cancelled));
        }

        Ok(delta)
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SelectPersona(id) => self.state.selected_persona = Some(id),
            Effect::EnterPhase(phase) => self.state.phase = phase,
            Effect::RecordInteraction => self.record(),
        }
    }

    fn record(&self) {
        let Some(persona) = self.state.selected_persona.as_deref() else {
            return;
        };

        // Without review the work counts as approved, with no rating
        let (verdict, rating) = if self.review_enabled() {
            let verdict = self.state.review_verdict;
            (verdict, verdict.map(|v| v.rating()))
        } else {
            (Some(Verdict::Approved), None)
        };

        let interaction = Interaction {
            request: self.state.request(),
            response: self
                .state
                .work_output
                .as_deref()
                .or(self.state.response.as_deref())
                .unwrap_or_default(),
            verdict,
            feedback: self.state.review_feedback.as_deref(),
            rating,
        };

        if let Err(e) = self
            .orchestrator
            .memory()
            .record_interaction(persona, interaction)
        {
            warn!(
                session = %self.state.session_id,
                persona = %persona,
                error = %e,
                "Failed to record interaction, continuing"
            );
        }
    }

    fn selected_is_worker(&self) -> bool {
        self.state
            .selected_persona
            .as_deref()
            .and_then(|id| self.orchestrator.registry().get(id))
            .is_some_and(|p| p.is_worker())
    }

    fn review_enabled(&self) -> bool {
        self.state.review_mode && self.orchestrator.registry().reviewer().is_some()
    }
}
