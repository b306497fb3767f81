//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is
//! concrete types. Ports exist for:
//! - Story generation (could swap Ollama -> Claude/OpenAI)
//! - Clock (for testing)

mod error;
mod external;
mod testing;

pub use error::{GenerationError, SnapshotError};
pub use external::{RegenerationContext, StorytellerPort};
pub use testing::ClockPort;

#[cfg(test)]
pub use external::MockStorytellerPort;
#[cfg(test)]
pub use testing::MockClockPort;
