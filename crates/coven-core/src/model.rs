//! Model call boundary
//!
//! Wraps an [`LlmProvider`] as `invoke(prompt) -> text` with a per-call
//! timeout and cooperative cancellation.

use coven_llm::{CompletionRequest, Error as LlmError, LlmProvider, Result as LlmResult};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default bound on a single model call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Prompt-in, text-out model client
#[derive(Clone)]
pub struct ModelClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl ModelClient {
    /// Client using the provider's default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: String::new(),
            max_tokens: None,
            temperature: None,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Set the model; empty means provider default
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the per-call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Provider name, for logs
    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `prompt` and return the completion text
    ///
    /// # Errors
    /// - Provider failure
    /// - `Timeout` when the call outlives the configured bound
    /// - `Cancelled` when `cancel` fires first
    pub async fn invoke(&self, prompt: &str, cancel: &CancellationToken) -> LlmResult<String> {
        let mut request = CompletionRequest::from_prompt(self.model.clone(), prompt);
        request.max_tokens = self.max_tokens;
        request.temperature = self.temperature;

        debug!(
            provider = self.provider.name(),
            prompt_chars = prompt.len(),
            "Invoking model"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = tokio::time::timeout(self.timeout, self.provider.complete(request)) => {
                match result {
                    Ok(response) => response.map(|r| r.content),
                    Err(_) => Err(LlmError::Timeout(self.timeout.as_millis() as u64)),
                }
            }
        }
    }
}

impl std::fmt::Debug for ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClient")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}
