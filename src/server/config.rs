//! Server configuration types
//!
//! Mirrors `config/default.toml`; every section falls back to its defaults
//! when omitted.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorAppConfig,
    #[serde(default)]
    pub memory: MemoryAppConfig,
    #[serde(default)]
    pub personas: PersonasConfig,
}

impl AppConfig {
    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = Self::validate_port(self.server.port) {
            bail!(e);
        }
        if let Err(e) = Self::validate_provider(&self.llm.provider) {
            bail!(e);
        }
        let cap = coven_core::orchestrator::DEFAULT_MAX_ITERATIONS;
        if !(1..=cap).contains(&self.orchestrator.max_iterations) {
            bail!("orchestrator.max_iterations must be between 1 and {}", cap);
        }
        if self.memory.max_patterns == 0 || self.memory.max_learnings == 0 {
            bail!("memory caps must be at least 1");
        }
        Ok(())
    }

    const VALID_PROVIDERS: &'static [&'static str] = &["auto", "anthropic", "mock"];

    pub fn validate_provider(s: &str) -> Result<(), String> {
        if Self::VALID_PROVIDERS.contains(&s) {
            Ok(())
        } else {
            Err(format!(
                "Invalid provider '{}'. Valid: {}",
                s,
                Self::VALID_PROVIDERS.join(", ")
            ))
        }
    }

    pub fn validate_port(p: u16) -> Result<(), String> {
        if p == 0 {
            Err("Port cannot be 0".to_string())
        } else {
            Ok(())
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `auto` uses Anthropic when a key is present, the mock otherwise
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "auto".to_string()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    120
}

/// Orchestrator configuration (exposed to TOML)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorAppConfig {
    /// Review cycles before the loop stops regardless of verdict
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    /// Persona used when classification fails
    #[serde(default = "default_persona")]
    pub default_persona: String,
    /// Review when the client does not say
    #[serde(default)]
    pub review_mode: bool,
}

impl Default for OrchestratorAppConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            default_persona: default_persona(),
            review_mode: false,
        }
    }
}

fn default_max_iterations() -> u32 {
    coven_core::orchestrator::DEFAULT_MAX_ITERATIONS
}

fn default_persona() -> String {
    coven_core::persona::DEFAULT_PERSONA.to_string()
}

/// Memory store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryAppConfig {
    /// Directory for `{persona}_memory.json`; `~/.coven/memory` when unset
    #[serde(default)]
    pub dir: Option<String>,
    #[serde(default = "default_max_patterns")]
    pub max_patterns: usize,
    #[serde(default = "default_max_learnings")]
    pub max_learnings: usize,
}

impl MemoryAppConfig {
    pub fn dir(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(PathBuf::from)
    }
}

impl Default for MemoryAppConfig {
    fn default() -> Self {
        Self {
            dir: None,
            max_patterns: default_max_patterns(),
            max_learnings: default_max_learnings(),
        }
    }
}

fn default_max_patterns() -> usize {
    50
}
fn default_max_learnings() -> usize {
    30
}

/// Persona preset overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonasConfig {
    #[serde(default)]
    pub dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.orchestrator.max_iterations, 3);
        assert_eq!(config.orchestrator.default_persona, "freddy");
        assert_eq!(config.memory.max_patterns, 50);
        assert_eq!(config.llm.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_validate_provider() {
        assert!(AppConfig::validate_provider("anthropic").is_ok());
        let err = AppConfig::validate_provider("openai").unwrap_err();
        assert!(err.contains("auto, anthropic, mock"));
    }

    #[test]
    fn test_validate_bounds_iterations() {
        let mut config = AppConfig::default();
        config.orchestrator.max_iterations = 0;
        assert!(config.validate().is_err());

        config.orchestrator.max_iterations = 10;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("between 1 and 3"));

        config.orchestrator.max_iterations = 1;
        assert!(config.validate().is_ok());

        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml_from_str("[llm]\nprovider = \"mock\"\n");
        assert_eq!(config.llm.provider, "mock");
        assert_eq!(config.llm.max_tokens, 4096);
        assert_eq!(config.server.port, 8000);
        assert!(config.memory.dir().is_none());
    }

    fn toml_from_str(src: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(src, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }
}
