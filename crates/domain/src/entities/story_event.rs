//! StoryEvent - one atomic entry in the narrative timeline.
//!
//! Events are plain value objects: "editing" an event always means replacing
//! the event at its timeline position, never mutating it in place. The
//! version history machinery in [`crate::aggregates::Chronicle`] relies on
//! that convention.

use serde::{Deserialize, Serialize};

use crate::entities::VersionKind;

/// A single entry in the story timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoryEvent {
    /// Something the protagonist does, authored or confirmed by the player.
    Action { text: String },
    /// Narrator prose advancing the story.
    Narration { text: String },
    /// A character stepping into the story for the first time.
    CharacterIntroduction { name: String, description: String },
    /// The protagonist arriving somewhere new.
    LocationChange { name: String, description: String },
}

impl StoryEvent {
    pub fn action(text: impl Into<String>) -> Self {
        Self::Action { text: text.into() }
    }

    pub fn narration(text: impl Into<String>) -> Self {
        Self::Narration { text: text.into() }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Action { .. } => "action",
            Self::Narration { .. } => "narration",
            Self::CharacterIntroduction { .. } => "character_introduction",
            Self::LocationChange { .. } => "location_change",
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Self::Action { .. })
    }

    /// Provenance assumed for a version seeded from already-live content.
    ///
    /// Actions are player-authored, so a seeded action version counts as an
    /// edit; every other kind of event originally came from the model.
    pub fn default_provenance(&self) -> VersionKind {
        if self.is_action() {
            VersionKind::Edit
        } else {
            VersionKind::Regenerate
        }
    }
}
