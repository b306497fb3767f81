extern crate self as talecraft_domain;

pub mod aggregates;
pub mod entities;
pub mod events;
pub mod ids;

// Re-export entities (explicit list in entities/mod.rs)
pub use entities::{
    EventHistory, StoryEvent, VersionEntry, VersionKind, VersionRemoval,
    DEFAULT_HISTORY_PAGE_SIZE,
};

pub use aggregates::Chronicle;
pub use events::ChronicleChange;
pub use ids::SessionId;
