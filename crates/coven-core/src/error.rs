//! Error types for coven-core
//!
//! This module provides error types and user-friendly error formatting.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid settings or unreadable persona definitions
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Request rejected before any work started
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persona id not present in the registry
    #[error("unknown persona: {0}")]
    UnknownPersona(String),

    /// Memory record could not be read or written
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Model call failed
    #[error("llm error: {0}")]
    Llm(#[from] coven_llm::Error),

    /// Internal error (serialization, channel closed, etc.)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Human-readable rendering of an error for CLI and chat surfaces
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::InvalidRequest(msg) => format!("📭 {}", msg),
            Error::UnknownPersona(id) => format!("👻 No persona named '{}' haunts this coven.", id),
            Error::Persistence(msg) => format!("🧠 Memory error: {}", msg),
            Error::Llm(coven_llm::Error::NotConfigured(msg)) => {
                format!("🔑 Model provider is not configured: {}", msg)
            }
            Error::Llm(coven_llm::Error::RateLimit) => {
                "⏳ Rate limit exceeded. Please try again later.".to_string()
            }
            Error::Llm(e) => format!("🤖 LLM error: {}", e),
            Error::Internal(msg) => format!("❌ Internal error: {}", msg),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Configuration(_) => Some(
                "💡 Check config/default.toml, config/local.toml or COVEN_* environment variables."
                    .to_string(),
            ),
            Error::UnknownPersona(_) => {
                Some("💡 Run `coven personas` to list the available personas.".to_string())
            }
            Error::Persistence(_) => {
                Some("💡 Make sure the memory directory exists and is writable.".to_string())
            }
            Error::Llm(coven_llm::Error::NotConfigured(_)) => {
                Some("💡 Set the ANTHROPIC_API_KEY environment variable.".to_string())
            }
            Error::Llm(e) if e.is_transient() => {
                Some("💡 Wait a moment and retry the request.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    output.push('\n');

    if let Some(suggestion) = error.suggestion() {
        output.push('\n');
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}

/// Format an error for display in a chat message
pub fn format_error_for_chat(error: &Error) -> String {
    let mut output = error.user_message();

    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }

    output
}
