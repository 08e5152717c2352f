//! Memory store facade used by the orchestrator and executor

use super::backend::MemoryBackend;
use super::context::format_learning_context;
use super::record::{Interaction, MemoryLimits, PersonaMemory};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Per-persona metrics for catalogs and dashboards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaMetricsSummary {
    /// Persona id
    pub persona: String,
    /// Interactions ever recorded
    pub total_interactions: u64,
    /// Fraction approved
    pub approval_rate: f64,
    /// Mean rating
    pub average_rating: f64,
    /// Stored successful patterns
    pub successful_patterns: usize,
    /// Stored feedback learnings
    pub learnings: usize,
}

/// Shared memory store
#[derive(Clone)]
pub struct PersonaMemoryStore {
    backend: Arc<dyn MemoryBackend>,
    limits: MemoryLimits,
}

impl PersonaMemoryStore {
    /// Create a store over `backend` with default limits
    #[must_use]
    pub fn new(backend: Arc<dyn MemoryBackend>) -> Self {
        Self {
            backend,
            limits: MemoryLimits::default(),
        }
    }

    /// Override list caps
    #[must_use]
    pub fn with_limits(mut self, limits: MemoryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current list caps
    #[must_use]
    pub fn limits(&self) -> MemoryLimits {
        self.limits
    }

    /// Load a record, creating an empty one if none exists
    pub fn get_memory(&self, persona: &str) -> Result<PersonaMemory> {
        Ok(self
            .backend
            .load(persona)?
            .unwrap_or_else(|| PersonaMemory::new(persona)))
    }

    /// Fold one finished interaction into the persona's record
    ///
    /// Load, mutate and save are not atomic together.
    #[instrument(skip(self, interaction), fields(verdict = ?interaction.verdict))]
    pub fn record_interaction(&self, persona: &str, interaction: Interaction<'_>) -> Result<()> {
        let mut memory = self.get_memory(persona)?;
        memory.record(&interaction, &self.limits);
        self.backend.save(&memory)?;

        info!(
            persona = %persona,
            total = memory.total_interactions,
            approval_rate = memory.metrics.approval_rate,
            "Recorded interaction"
        );
        Ok(())
    }

    /// Learning block for `persona`'s next prompt about `request`
    ///
    /// Empty iff the persona has no recorded interactions. A backend failure
    /// is logged and yields an empty block.
    pub fn get_learning_context(&self, persona: &str, request: &str) -> String {
        match self.backend.load(persona) {
            Ok(Some(memory)) => format_learning_context(&memory, request),
            Ok(None) => String::new(),
            Err(e) => {
                warn!(persona = %persona, error = %e, "Failed to load memory, continuing without learning context");
                String::new()
            }
        }
    }

    /// Metrics for each of `personas`, in the given order
    ///
    /// Personas whose record cannot be read are reported as empty.
    pub fn all_metrics<'a>(
        &self,
        personas: impl IntoIterator<Item = &'a str>,
    ) -> Vec<PersonaMetricsSummary> {
        personas
            .into_iter()
            .map(|persona| {
                let memory = self.get_memory(persona).unwrap_or_else(|e| {
                    warn!(persona = %persona, error = %e, "Failed to load memory for metrics");
                    PersonaMemory::new(persona)
                });
                PersonaMetricsSummary {
                    persona: persona.to_string(),
                    total_interactions: memory.total_interactions,
                    approval_rate: memory.metrics.approval_rate,
                    average_rating: memory.metrics.average_rating,
                    successful_patterns: memory.successful_patterns.len(),
                    learnings: memory.feedback_learnings.len(),
                }
            })
            .collect()
    }
}

impl std::fmt::Debug for PersonaMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonaMemoryStore")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}
