//! External service port traits (story generation).

use async_trait::async_trait;

use talecraft_domain::StoryEvent;

use super::error::GenerationError;

/// Context handed to the storyteller when regenerating an event.
#[derive(Debug, Clone)]
pub struct RegenerationContext {
    /// The full timeline at the moment regeneration was requested.
    pub events: Vec<StoryEvent>,
    /// Position of the event being replaced.
    pub position: usize,
}

impl RegenerationContext {
    /// The event being replaced, if the position is still live.
    pub fn target(&self) -> Option<&StoryEvent> {
        self.events.get(self.position)
    }
}

/// The external generation collaborator: produces a replacement event for
/// one timeline position. Prompt construction, streaming, and the wire
/// protocol all live behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorytellerPort: Send + Sync {
    async fn generate_event(
        &self,
        context: RegenerationContext,
    ) -> Result<StoryEvent, GenerationError>;
}
