//! Coven LLM - Provider Abstraction
//!
//! This crate provides the model-call boundary for Coven:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Anthropic: Claude Messages API provider
//! - Mock: scripted provider for tests and offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod provider;
pub mod util;

pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::{MockProvider, MockReply};
pub use provider::LlmProvider;
