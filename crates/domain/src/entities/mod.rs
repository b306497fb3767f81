//! Domain entities for the narrative timeline.

pub mod event_history;
pub mod story_event;

pub use event_history::{
    EventHistory, VersionEntry, VersionKind, VersionRemoval, DEFAULT_HISTORY_PAGE_SIZE,
};
pub use story_event::StoryEvent;
