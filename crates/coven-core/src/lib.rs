//! Coven Core - Persona Orchestration Engine
//!
//! This crate provides everything between an inbound request and the model call:
//! - Persona: immutable registry of persona presets loaded from TOML
//! - Classifier: routes free text to one persona via a model call
//! - Executor: builds persona prompts and runs workers and the reviewer
//! - Memory: per-persona interaction log, metrics and learning context
//! - Orchestrator: the review-loop state machine and its session driver

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod error;
pub mod executor;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod persona;
pub mod session;

pub use classifier::Classifier;
pub use error::{format_error_for_chat, format_error_for_cli, Error, Result, UserFriendlyError};
pub use executor::{parse_verdict, PersonaExecutor, StepOutcome};
pub use memory::{
    InMemoryBackend, JsonFileBackend, MemoryBackend, MemoryLimits, PersonaMemory,
    PersonaMemoryStore, PersonaMetricsSummary,
};
pub use model::ModelClient;
pub use orchestrator::{
    Orchestrator, OrchestratorConfig, OrchestratorInput, SessionEvent, SessionMachine,
};
pub use persona::{Persona, PersonaLoader, PersonaRegistry, PersonaRole};
pub use session::{Phase, SessionState, Verdict};
