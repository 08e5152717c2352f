//! Orchestrator struct and session entry point

use super::config::{OrchestratorConfig, OrchestratorInput};
use super::events::{SessionEvent, CLASSIFIER_NAME};
use super::session_machine::SessionMachine;
use crate::classifier::Classifier;
use crate::error::{format_error_for_chat, Error, Result};
use crate::executor::PersonaExecutor;
use crate::memory::{PersonaMemoryStore, PersonaMetricsSummary};
use crate::model::ModelClient;
use crate::persona::PersonaRegistry;
use crate::session::SessionState;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Routes requests to personas and drives the review loop
pub struct Orchestrator {
    registry: Arc<PersonaRegistry>,
    classifier: Classifier,
    executor: PersonaExecutor,
    memory: PersonaMemoryStore,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Create an orchestrator; classifier and personas share `model`
    #[must_use]
    pub fn new(
        registry: Arc<PersonaRegistry>,
        model: ModelClient,
        memory: PersonaMemoryStore,
    ) -> Self {
        Self {
            classifier: Classifier::new(registry.clone(), model.clone()),
            executor: PersonaExecutor::new(registry.clone(), model, memory.clone()),
            registry,
            memory,
            config: OrchestratorConfig::default(),
        }
    }

    /// Set the configuration
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Persona registry
    #[must_use]
    pub fn registry(&self) -> &Arc<PersonaRegistry> {
        &self.registry
    }

    /// Memory store
    #[must_use]
    pub fn memory(&self) -> &PersonaMemoryStore {
        &self.memory
    }

    /// Configuration
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Name of the provider behind persona runs
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.executor.model().provider_name()
    }

    pub(crate) fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub(crate) fn executor(&self) -> &PersonaExecutor {
        &self.executor
    }

    /// Learning metrics for every registered persona, in catalog order
    #[must_use]
    pub fn metrics(&self) -> Vec<PersonaMetricsSummary> {
        self.memory.all_metrics(self.registry.iter().map(|p| p.id()))
    }

    /// Build a machine for `input` without running it
    ///
    /// An explicit persona that is not registered is ignored.
    ///
    /// # Errors
    /// `InvalidRequest` for blank content.
    pub fn session(&self, input: OrchestratorInput) -> Result<SessionMachine<'_>> {
        if input.content.trim().is_empty() {
            return Err(Error::InvalidRequest("Request content is empty".to_string()));
        }

        let preselected = input
            .persona
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .and_then(|requested| match self.registry.resolve(requested) {
                Some(persona) => Some(persona.id().to_string()),
                None => {
                    warn!(persona = %requested, "Unknown persona requested, classifying instead");
                    None
                }
            });

        let review_mode = input.review_mode.unwrap_or(self.config.review_by_default);
        let state = SessionState::new(input.content, review_mode);

        Ok(SessionMachine::new(self, state, preselected))
    }

    /// Run one session to completion, forwarding every delta to `events`
    ///
    /// Emits `thinking`, then zero or more `stream`, then exactly one
    /// `complete`; or a single `error` that ends the session. A closed
    /// receiver is not an error.
    #[instrument(skip(self, input, events, cancel), fields(review = ?input.review_mode))]
    pub async fn run(
        &self,
        input: OrchestratorInput,
        events: &UnboundedSender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Result<SessionState> {
        let mut machine = match self.session(input) {
            Ok(machine) => machine,
            Err(e) => {
                let _ = events.send(SessionEvent::error(uuid::Uuid::nil(), format_error_for_chat(&e)));
                return Err(e);
            }
        };

        let session_id = machine.state().session_id;
        let (persona, display) = match machine.pending_persona() {
            Some(id) => {
                let name = self.registry.get(id).map_or(id.as_str(), |p| p.name());
                (id.clone(), name.to_string())
            }
            None => (CLASSIFIER_NAME.to_string(), "Classifier".to_string()),
        };
        let _ = events.send(SessionEvent::thinking(session_id, &persona, &display));

        info!(session = %session_id, persona = %persona, "Session started");

        while !machine.is_complete() {
            match machine.step(&cancel).await {
                Ok(Some(event)) => {
                    let _ = events.send(event);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(session = %session_id, error = %e, "Session aborted");
                    let _ = events.send(SessionEvent::error(session_id, format_error_for_chat(&e)));
                    return Err(e);
                }
            }
        }

        let state = machine.into_state();
        info!(
            session = %session_id,
            persona = ?state.selected_persona,
            iterations = state.iteration_count,
            verdict = ?state.review_verdict,
            "Session complete"
        );
        Ok(state)
    }
}
