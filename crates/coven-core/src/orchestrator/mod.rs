//! Orchestrator - review loop
//!
//! Entry routing (explicit persona or classifier), persona execution, the
//! bounded review loop and termination, expressed as a pure transition table
//! in [`machine`] and driven one step at a time by [`SessionMachine`].

mod config;
mod core;
mod events;
pub mod machine;
mod session_machine;

pub use self::core::Orchestrator;
pub use config::{OrchestratorConfig, OrchestratorInput, DEFAULT_MAX_ITERATIONS};
pub use events::{SessionEvent, CLASSIFIER_NAME};
pub use session_machine::SessionMachine;

#[cfg(test)]
mod tests;
