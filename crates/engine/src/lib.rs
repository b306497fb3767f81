//! Talecraft Engine - session state, version history operations, and
//! regeneration for the narrative timeline.
//!
//! The engine owns the mutable side of the system: a serialized,
//! single-writer state container per session ([`stores::ChronicleHandle`]),
//! the timeline use cases that mutate it ([`use_cases::TimelineOps`]), and
//! the regeneration controller that feeds model output back through the
//! same operations ([`use_cases::RegenerationOps`]). The LLM backend is
//! consumed through the narrow [`infrastructure::ports::StorytellerPort`]
//! trait and is never part of persisted state.

pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

pub use app::StoryApp;
pub use infrastructure::settings::EngineSettings;
