//! Server module for Coven
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `providers`: LLM provider resolution
//! - `builder`: Orchestrator assembly shared with the CLI
//! - `init`: Router assembly and the run loop
//! - `shutdown`: Ctrl+C / SIGTERM handling

mod builder;
pub mod config;
mod init;
mod loader;
mod providers;
mod shutdown;

pub use builder::build_orchestrator;
pub use init::{app, run};
pub use loader::load_config;
pub use shutdown::wait_for_shutdown_signal;
