use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::convert::{convert_messages, response_text, usage};
use super::types::{AnthropicConfig, ErrorEnvelope, MessagesRequest, MessagesResponse, API_VERSION};
use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use crate::util::sanitize_api_error;

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(AnthropicConfig::from_env()?)
    }

    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        debug!(%url, "sending messages request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    Error::Network(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if status.as_u16() == 429 {
            return Err(Error::RateLimit);
        }

        if !status.is_success() {
            let detail = match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => format!("{}: {}", envelope.error.r#type, envelope.error.message),
                Err(_) => format!("HTTP {status}: {body}"),
            };
            warn!(status = status.as_u16(), "anthropic request failed");
            return Err(Error::Api(sanitize_api_error(&detail)));
        }

        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            self.config.default_model.clone()
        } else {
            request.model.clone()
        };

        let (system, messages) = convert_messages(&request.messages);
        if messages.is_empty() {
            return Err(Error::Api("request has no user messages".to_string()));
        }

        let wire_request = MessagesRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
            system,
            messages,
            temperature: request.temperature,
        };

        let response = self.send(&wire_request).await?;
        let content = response_text(&response);
        if content.trim().is_empty() {
            return Err(Error::InvalidResponse("response contained no text".to_string()));
        }

        Ok(CompletionResponse {
            content,
            usage: Some(usage(&response)),
            finish_reason: response.stop_reason.clone(),
            model: response.model,
        })
    }
}
