//! Memory - per-persona learning log
//!
//! Every worker persona owns one [`PersonaMemory`] record. Finished sessions are
//! folded into it with [`PersonaMemoryStore::record_interaction`], and
//! [`PersonaMemoryStore::get_learning_context`] turns it back into a block of
//! text that is prepended to the persona's next prompt.
//!
//! Records are read and written whole through a [`MemoryBackend`]. There is no
//! lock across the read-modify-write in `record_interaction`: two sessions that
//! finish for the same persona at the same moment can lose one update.

mod backend;
mod category;
mod context;
mod record;
mod store;

pub use backend::{InMemoryBackend, JsonFileBackend, MemoryBackend};
pub use category::{categorize_request, CATEGORIES, GENERAL_CATEGORY};
pub use context::format_learning_context;
pub use record::{
    FeedbackLearning, Interaction, MemoryLimits, PerformanceMetrics, PersonaMemory,
    SuccessfulPattern, REQUEST_SNIPPET_CHARS, RESPONSE_SNIPPET_CHARS,
};
pub use store::{PersonaMemoryStore, PersonaMetricsSummary};

#[cfg(test)]
pub use backend::MockMemoryBackend;
