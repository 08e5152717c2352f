//! Anthropic Messages API provider (text completions only)

mod convert;
mod provider;
mod types;


pub use provider::AnthropicProvider;
pub use types::{AnthropicConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
