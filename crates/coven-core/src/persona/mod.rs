//! Persona - preset registry
//!
//! Personas are data: a behavioral prompt template, routing hints, a role and
//! display metadata, loaded from TOML presets.
//!
//! # Example
//!
//! ```rust,ignore
//! use coven_core::persona::PersonaRegistry;
//!
//! let registry = PersonaRegistry::builtin()?;
//! let freddy = registry.get("freddy").unwrap();
//! println!("{} {} - {}", freddy.info.icon, freddy.info.name, freddy.info.specialty);
//! ```

mod loader;
mod preset;
mod registry;

pub use loader::PersonaLoader;
pub use preset::{Persona, PersonaInfo, PersonaPrompt, PersonaRole, RoutingHints};
pub use registry::{PersonaRegistry, DEFAULT_PERSONA};
