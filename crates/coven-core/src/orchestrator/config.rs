//! Orchestrator configuration
//!
//! Contains configuration types for the orchestrator:
//! - `OrchestratorConfig` for loop settings
//! - `OrchestratorInput` for one inbound request

/// Default cap on review cycles
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Input for orchestration
#[derive(Debug, Clone, Default)]
pub struct OrchestratorInput {
    /// Request text
    pub content: String,
    /// Explicitly requested persona id
    pub persona: Option<String>,
    /// Route worker output through the reviewer; `None` uses the configured default
    pub review_mode: Option<bool>,
}

impl OrchestratorInput {
    /// Create a new input
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    /// Ask for a specific persona
    #[must_use]
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    /// Enable or disable review mode
    #[must_use]
    pub fn with_review(mut self, enabled: bool) -> Self {
        self.review_mode = Some(enabled);
        self
    }
}

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Review cycles before the loop stops regardless of verdict
    pub max_iterations: u32,
    /// Review mode when the input does not say
    pub review_by_default: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            review_by_default: false,
        }
    }
}

impl OrchestratorConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the review cycle cap, clamped to `1..=DEFAULT_MAX_ITERATIONS`
    #[must_use]
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.clamp(1, DEFAULT_MAX_ITERATIONS);
        self
    }

    /// Set the default review mode
    #[must_use]
    pub fn with_review_by_default(mut self, enabled: bool) -> Self {
        self.review_by_default = enabled;
        self
    }
}
