//! Mutation events returned by the [`crate::aggregates::Chronicle`] aggregate.

use serde::{Deserialize, Serialize};

/// What a chronicle mutation did. Mutators that reject their input return
/// `None` instead of a change (validation no-ops are silent by contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChronicleChange {
    /// A new event was appended to the end of the timeline.
    EventAppended { position: usize },
    /// A history was lazily created for a position, seeded from the live
    /// event.
    HistorySeeded { position: usize },
    /// A new version was appended and mirrored into the timeline.
    VersionAdded {
        position: usize,
        version_index: usize,
    },
    /// The current-version pointer moved and the timeline was refreshed.
    VersionSelected {
        position: usize,
        version_index: usize,
    },
    /// A version was removed from a history.
    VersionDeleted {
        position: usize,
        current_version_index: usize,
        /// Whether the deleted version was current, forcing a timeline
        /// refresh.
        timeline_updated: bool,
    },
    /// An event was removed from the timeline, discarding its history and
    /// re-keying every later history.
    EventDeleted {
        position: usize,
        histories_rekeyed: usize,
    },
}
