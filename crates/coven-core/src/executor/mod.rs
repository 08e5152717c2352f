//! Executor - runs one persona or the reviewer against a session
//!
//! Both runs are fail-soft: a failed model call becomes a persona-flavored
//! response and a [`StepOutcome::Failed`], never an error.

mod prompt;
mod verdict;

pub use prompt::{build_persona_prompt, build_review_prompt};
pub use verdict::parse_verdict;

use crate::error::{Error, Result};
use crate::memory::PersonaMemoryStore;
use crate::model::ModelClient;
use crate::persona::{Persona, PersonaRegistry};
use crate::session::SessionState;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

/// How a step went, as far as the state machine cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Model returned text
    Succeeded,
    /// Model call failed; `response` holds the flavored error
    Failed,
}

/// Persona and reviewer runner
#[derive(Debug, Clone)]
pub struct PersonaExecutor {
    registry: Arc<PersonaRegistry>,
    model: ModelClient,
    memory: PersonaMemoryStore,
}

impl PersonaExecutor {
    /// Create an executor
    #[must_use]
    pub fn new(
        registry: Arc<PersonaRegistry>,
        model: ModelClient,
        memory: PersonaMemoryStore,
    ) -> Self {
        Self {
            registry,
            model,
            memory,
        }
    }

    /// Model client used for persona runs
    #[must_use]
    pub fn model(&self) -> &ModelClient {
        &self.model
    }

    /// Run `persona_id` on the session
    ///
    /// Sets `response`, and `work_output` for workers. Revisions reuse the
    /// previous work and feedback already in `state`.
    #[instrument(skip(self, state, cancel), fields(session = %state.session_id, iteration = state.iteration_count))]
    pub async fn run_persona(
        &self,
        persona_id: &str,
        state: &mut SessionState,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome> {
        let persona = self.persona(persona_id)?;

        let learning_context = if persona.is_worker() {
            self.memory.get_learning_context(persona.id(), state.request())
        } else {
            String::new()
        };
        let reviewer_name = self.registry.reviewer().map_or("reviewer", |r| r.name());
        let prompt = build_persona_prompt(persona, &learning_context, state, reviewer_name);

        match self.model.invoke(&prompt, cancel).await {
            Ok(text) => {
                if persona.is_worker() {
                    state.work_output = Some(text.clone());
                }
                state.response = Some(text);
                info!(
                    persona = %persona.id(),
                    revision = state.is_revision(),
                    with_learning = !learning_context.is_empty(),
                    "Persona responded"
                );
                Ok(StepOutcome::Succeeded)
            }
            Err(e) => {
                error!(persona = %persona.id(), error = %e, "Persona call failed");
                state.response = Some(persona.failure_message(&e.to_string()));
                Ok(StepOutcome::Failed)
            }
        }
    }

    /// Run the reviewer on the latest work
    ///
    /// On success sets `review_feedback`, `response` and `review_verdict` and
    /// increments `iteration_count`. On failure the verdict is cleared and the
    /// count is left alone.
    #[instrument(skip(self, state, cancel), fields(session = %state.session_id, iteration = state.iteration_count))]
    pub async fn run_reviewer(
        &self,
        state: &mut SessionState,
        cancel: &CancellationToken,
    ) -> Result<StepOutcome> {
        let reviewer = self
            .registry
            .reviewer()
            .ok_or_else(|| Error::Configuration("no reviewer persona registered".to_string()))?;
        let prompt = build_review_prompt(reviewer, state);

        match self.model.invoke(&prompt, cancel).await {
            Ok(text) => {
                let verdict = parse_verdict(&text);
                state.review_feedback = Some(text.clone());
                state.response = Some(text);
                state.review_verdict = Some(verdict);
                state.iteration_count += 1;
                info!(
                    reviewer = %reviewer.id(),
                    verdict = %verdict,
                    iteration = state.iteration_count,
                    "Review completed"
                );
                Ok(StepOutcome::Succeeded)
            }
            Err(e) => {
                error!(reviewer = %reviewer.id(), error = %e, "Reviewer call failed");
                state.response = Some(reviewer.failure_message(&e.to_string()));
                state.review_verdict = None;
                Ok(StepOutcome::Failed)
            }
        }
    }

    fn persona(&self, id: &str) -> Result<&Persona> {
        self.registry
            .get(id)
            .ok_or_else(|| Error::UnknownPersona(id.to_string()))
    }
}

#[cfg(test)]
mod tests;
