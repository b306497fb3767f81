//! Chronicle aggregate - the event timeline and its version histories.
//!
//! A `Chronicle` owns two structures that must always move together:
//!
//! - the **timeline**: an ordered, mutable sequence of [`StoryEvent`]s,
//!   addressed by position (positions are structural, not stable ids - they
//!   shift when an earlier event is deleted)
//! - the **history store**: a sparse map from position to [`EventHistory`],
//!   present only for positions that have been edited or regenerated at
//!   least once
//!
//! # Invariants
//!
//! - For every position `p` with a history,
//!   `timeline[p] == histories[p].current().event()`
//! - Every history has at least one entry
//! - History keys always address live timeline positions
//!
//! All mutators preserve these invariants as one atomic unit; no caller may
//! write either structure directly. Invalid inputs (out-of-range positions
//! or version indices, deleting a sole remaining version) are silent no-ops
//! by contract: the history UI only ever presents valid indices, so these
//! guards are a last line of defense, not a reported-error path.
//!
//! Serialized form is plain nested data: a sequence plus a string-keyed
//! mapping (serde_json writes the `usize` keys as JSON strings).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{
    EventHistory, StoryEvent, VersionEntry, VersionKind, VersionRemoval,
};
use crate::events::ChronicleChange;

/// The canonical story timeline plus per-position version histories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chronicle {
    events: Vec<StoryEvent>,
    histories: BTreeMap<usize, EventHistory>,
}

impl Chronicle {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Append an event to the end of the timeline.
    pub fn push_event(&mut self, event: StoryEvent) -> ChronicleChange {
        self.events.push(event);
        ChronicleChange::EventAppended {
            position: self.events.len() - 1,
        }
    }

    /// Lazily create a history at `position`, seeded from the live event.
    ///
    /// Idempotent: a no-op if a history already exists or no event lives at
    /// `position`. The timeline is never touched.
    pub fn ensure_history(
        &mut self,
        position: usize,
        now: DateTime<Utc>,
    ) -> Option<ChronicleChange> {
        if self.histories.contains_key(&position) {
            return None;
        }
        let event = self.events.get(position)?.clone();
        self.histories.insert(position, EventHistory::seeded(event, now));
        Some(ChronicleChange::HistorySeeded { position })
    }

    /// Append `event` as a new version at `position`, make it current, and
    /// mirror it into the timeline.
    ///
    /// If no history exists yet, one is seeded first from the
    /// pre-replacement event so no version is silently lost. A position with
    /// no live event is a no-op.
    pub fn add_version(
        &mut self,
        position: usize,
        event: StoryEvent,
        kind: VersionKind,
        now: DateTime<Utc>,
    ) -> Option<ChronicleChange> {
        if position >= self.events.len() {
            return None;
        }
        self.ensure_history(position, now);
        let history = self.histories.get_mut(&position)?;
        let version_index = history.push(event.clone(), kind, now);
        self.events[position] = event;
        Some(ChronicleChange::VersionAdded {
            position,
            version_index,
        })
    }

    /// Move the current-version pointer at `position` and mirror the
    /// pointed-to event into the timeline.
    ///
    /// This is how "restore an older version" works: newer versions are kept,
    /// only the pointer moves. No-op if no history exists or the index is out
    /// of range.
    pub fn select_version(
        &mut self,
        position: usize,
        version_index: usize,
    ) -> Option<ChronicleChange> {
        let history = self.histories.get_mut(&position)?;
        let event = history.select(version_index)?.clone();
        let slot = self.events.get_mut(position)?;
        *slot = event;
        Some(ChronicleChange::VersionSelected {
            position,
            version_index,
        })
    }

    /// Remove one version from the history at `position`, applying the
    /// pointer-adjustment rules of [`EventHistory::remove`]. The timeline is
    /// rewritten only when the deleted version was current.
    pub fn delete_version(
        &mut self,
        position: usize,
        version_index: usize,
    ) -> Option<ChronicleChange> {
        let history = self.histories.get_mut(&position)?;
        let removal = history.remove(version_index)?;
        let timeline_updated = matches!(removal, VersionRemoval::CurrentChanged { .. });
        let current_version_index = history.current_index();
        if timeline_updated {
            let event = history.current().event().clone();
            if let Some(slot) = self.events.get_mut(position) {
                *slot = event;
            }
        }
        Some(ChronicleChange::VersionDeleted {
            position,
            current_version_index,
            timeline_updated,
        })
    }

    /// Remove the event at `position` from the timeline (every later event
    /// shifts down by one) and discard its entire history.
    ///
    /// Every remaining history keyed past `position` is re-keyed to
    /// `key - 1` so it stays attached to the same logical event. Skipping
    /// this re-keying would attach later events' histories to the wrong
    /// event after any deletion.
    pub fn delete_event(&mut self, position: usize) -> Option<ChronicleChange> {
        if position >= self.events.len() {
            return None;
        }
        self.events.remove(position);
        self.histories.remove(&position);

        let shifted: Vec<usize> = self
            .histories
            .range(position + 1..)
            .map(|(key, _)| *key)
            .collect();
        let mut histories_rekeyed = 0;
        for key in shifted {
            if let Some(history) = self.histories.remove(&key) {
                self.histories.insert(key - 1, history);
                histories_rekeyed += 1;
            }
        }
        Some(ChronicleChange::EventDeleted {
            position,
            histories_rekeyed,
        })
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub fn events(&self) -> &[StoryEvent] {
        &self.events
    }

    pub fn event_at(&self, position: usize) -> Option<&StoryEvent> {
        self.events.get(position)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn history(&self, position: usize) -> Option<&EventHistory> {
        self.histories.get(&position)
    }

    pub fn has_history(&self, position: usize) -> bool {
        self.histories.contains_key(&position)
    }

    /// Positions that currently carry a history, in ascending order.
    pub fn history_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.histories.keys().copied()
    }

    /// One page of the version history at `position`. Missing histories and
    /// out-of-range pages yield an empty slice, never an error.
    pub fn history_page(&self, position: usize, page: usize, page_size: usize) -> &[VersionEntry] {
        self.histories
            .get(&position)
            .map_or(&[] as &[VersionEntry], |history| {
                history.page(page, page_size)
            })
    }

    /// Page count of the history at `position`, or 0 without a history.
    pub fn history_page_count(&self, position: usize, page_size: usize) -> usize {
        self.histories
            .get(&position)
            .map_or(0, |history| history.page_count(page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn narration(text: &str) -> StoryEvent {
        StoryEvent::narration(text)
    }

    /// Timeline of `count` narration events, no histories yet.
    fn chronicle_with(count: usize) -> Chronicle {
        let mut chronicle = Chronicle::new();
        for i in 0..count {
            chronicle.push_event(narration(&format!("event {i}")));
        }
        chronicle
    }

    /// The divergence invariant: every history's current version mirrors the
    /// live timeline event at its position.
    fn assert_consistent(chronicle: &Chronicle) {
        for position in chronicle.history_positions().collect::<Vec<_>>() {
            let history = chronicle.history(position).expect("position listed");
            assert!(!history.is_empty(), "history at {position} is empty");
            assert!(
                history.current_index() < history.len(),
                "pointer out of range at {position}"
            );
            assert_eq!(
                chronicle.event_at(position),
                Some(history.current().event()),
                "timeline and history diverge at {position}"
            );
        }
    }

    mod ensure_history {
        use super::*;

        #[test]
        fn seeds_one_entry_from_live_event() {
            let mut chronicle = chronicle_with(2);
            let change = chronicle.ensure_history(1, fixed_time());
            assert_eq!(change, Some(ChronicleChange::HistorySeeded { position: 1 }));
            let history = chronicle.history(1).unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history.current().event(), &narration("event 1"));
            assert_consistent(&chronicle);
        }

        #[test]
        fn is_idempotent() {
            let mut chronicle = chronicle_with(1);
            assert!(chronicle.ensure_history(0, fixed_time()).is_some());
            assert!(chronicle.ensure_history(0, fixed_time()).is_none());
            assert_eq!(chronicle.history(0).unwrap().len(), 1);
        }

        #[test]
        fn missing_event_is_a_no_op() {
            let mut chronicle = chronicle_with(1);
            assert!(chronicle.ensure_history(7, fixed_time()).is_none());
            assert!(!chronicle.has_history(7));
        }

        #[test]
        fn never_touches_the_timeline() {
            let mut chronicle = chronicle_with(2);
            let before = chronicle.events().to_vec();
            chronicle.ensure_history(0, fixed_time());
            assert_eq!(chronicle.events(), &before[..]);
        }
    }

    mod add_version {
        use super::*;

        #[test]
        fn seeds_then_appends_and_mirrors() {
            let mut chronicle = Chronicle::new();
            chronicle.push_event(StoryEvent::action("go north"));

            let change = chronicle.add_version(
                0,
                StoryEvent::action("go east"),
                VersionKind::Edit,
                fixed_time(),
            );
            assert_eq!(
                change,
                Some(ChronicleChange::VersionAdded {
                    position: 0,
                    version_index: 1
                })
            );

            let history = chronicle.history(0).unwrap();
            assert_eq!(history.len(), 2);
            assert_eq!(history.current_index(), 1);
            assert_eq!(history.entries()[0].event(), &StoryEvent::action("go north"));
            assert_eq!(chronicle.event_at(0), Some(&StoryEvent::action("go east")));
            assert_consistent(&chronicle);
        }

        #[test]
        fn out_of_range_position_is_a_no_op() {
            let mut chronicle = chronicle_with(1);
            let change =
                chronicle.add_version(3, narration("x"), VersionKind::Edit, fixed_time());
            assert!(change.is_none());
            assert!(!chronicle.has_history(3));
            assert_eq!(chronicle.len(), 1);
        }

        #[test]
        fn preserves_existing_versions() {
            let mut chronicle = chronicle_with(1);
            chronicle.add_version(0, narration("v1"), VersionKind::Edit, fixed_time());
            chronicle.add_version(0, narration("v2"), VersionKind::Regenerate, fixed_time());
            let history = chronicle.history(0).unwrap();
            assert_eq!(history.len(), 3);
            assert_eq!(history.entries()[1].kind(), VersionKind::Edit);
            assert_eq!(history.entries()[2].kind(), VersionKind::Regenerate);
            assert_consistent(&chronicle);
        }
    }

    mod select_version {
        use super::*;

        #[test]
        fn restores_older_version_without_deleting_newer_ones() {
            let mut chronicle = chronicle_with(1);
            chronicle.add_version(0, narration("v1"), VersionKind::Edit, fixed_time());
            chronicle.add_version(0, narration("v2"), VersionKind::Edit, fixed_time());

            chronicle.select_version(0, 0);
            assert_eq!(chronicle.event_at(0), Some(&narration("event 0")));
            assert_eq!(chronicle.history(0).unwrap().len(), 3);
            assert_consistent(&chronicle);

            // Round-trip back to the newest version.
            chronicle.select_version(0, 2);
            assert_eq!(chronicle.event_at(0), Some(&narration("v2")));
            assert_consistent(&chronicle);
        }

        #[test]
        fn missing_history_is_a_no_op() {
            let mut chronicle = chronicle_with(1);
            assert!(chronicle.select_version(0, 0).is_none());
        }

        #[test]
        fn out_of_range_index_is_a_no_op() {
            let mut chronicle = chronicle_with(1);
            chronicle.add_version(0, narration("v1"), VersionKind::Edit, fixed_time());
            assert!(chronicle.select_version(0, 9).is_none());
            assert_eq!(chronicle.event_at(0), Some(&narration("v1")));
            assert_consistent(&chronicle);
        }
    }

    mod delete_version {
        use super::*;

        /// History with entries v0/v1/v2, current = 2.
        fn three_version_chronicle() -> Chronicle {
            let mut chronicle = Chronicle::new();
            chronicle.push_event(narration("v0"));
            chronicle.add_version(0, narration("v1"), VersionKind::Edit, fixed_time());
            chronicle.add_version(0, narration("v2"), VersionKind::Edit, fixed_time());
            chronicle
        }

        #[test]
        fn deleting_before_current_shifts_pointer_without_rewriting_timeline() {
            let mut chronicle = three_version_chronicle();
            let change = chronicle.delete_version(0, 1);
            assert_eq!(
                change,
                Some(ChronicleChange::VersionDeleted {
                    position: 0,
                    current_version_index: 1,
                    timeline_updated: false,
                })
            );
            assert_eq!(chronicle.event_at(0), Some(&narration("v2")));
            assert_consistent(&chronicle);
        }

        #[test]
        fn deleting_current_moves_pointer_back_and_rewrites_timeline() {
            let mut chronicle = three_version_chronicle();
            let change = chronicle.delete_version(0, 2);
            assert_eq!(
                change,
                Some(ChronicleChange::VersionDeleted {
                    position: 0,
                    current_version_index: 1,
                    timeline_updated: true,
                })
            );
            assert_eq!(chronicle.event_at(0), Some(&narration("v1")));
            assert_consistent(&chronicle);
        }

        #[test]
        fn deleting_after_current_leaves_pointer_and_timeline_alone() {
            let mut chronicle = three_version_chronicle();
            chronicle.select_version(0, 0);
            let change = chronicle.delete_version(0, 2);
            assert_eq!(
                change,
                Some(ChronicleChange::VersionDeleted {
                    position: 0,
                    current_version_index: 0,
                    timeline_updated: false,
                })
            );
            assert_eq!(chronicle.event_at(0), Some(&narration("v0")));
            assert_consistent(&chronicle);
        }

        #[test]
        fn sole_version_cannot_be_deleted() {
            let mut chronicle = chronicle_with(1);
            chronicle.ensure_history(0, fixed_time());
            assert!(chronicle.delete_version(0, 0).is_none());
            assert_eq!(chronicle.history(0).unwrap().len(), 1);
            assert_consistent(&chronicle);
        }

        #[test]
        fn missing_history_is_a_no_op() {
            let mut chronicle = chronicle_with(1);
            assert!(chronicle.delete_version(0, 0).is_none());
        }
    }

    mod delete_event {
        use super::*;

        #[test]
        fn splices_timeline_and_discards_history() {
            let mut chronicle = chronicle_with(3);
            chronicle.add_version(1, narration("edited"), VersionKind::Edit, fixed_time());

            let change = chronicle.delete_event(1);
            assert_eq!(
                change,
                Some(ChronicleChange::EventDeleted {
                    position: 1,
                    histories_rekeyed: 0,
                })
            );
            assert_eq!(chronicle.len(), 2);
            assert_eq!(chronicle.event_at(1), Some(&narration("event 2")));
            assert!(!chronicle.has_history(1));
            assert_consistent(&chronicle);
        }

        #[test]
        fn rekeys_later_histories_down_by_one() {
            let mut chronicle = chronicle_with(5);
            for position in [1, 2, 4] {
                chronicle.add_version(
                    position,
                    narration(&format!("edited {position}")),
                    VersionKind::Edit,
                    fixed_time(),
                );
            }

            let change = chronicle.delete_event(2);
            assert_eq!(
                change,
                Some(ChronicleChange::EventDeleted {
                    position: 2,
                    histories_rekeyed: 1,
                })
            );
            assert_eq!(
                chronicle.history_positions().collect::<Vec<_>>(),
                vec![1, 3]
            );
            // Old key 4 now lives at 3 and still mirrors its event.
            assert_eq!(chronicle.event_at(3), Some(&narration("edited 4")));
            assert_eq!(chronicle.len(), 4);
            assert_consistent(&chronicle);
        }

        #[test]
        fn earlier_histories_are_untouched() {
            let mut chronicle = chronicle_with(3);
            chronicle.add_version(0, narration("edited 0"), VersionKind::Edit, fixed_time());
            chronicle.delete_event(2);
            assert_eq!(
                chronicle.history_positions().collect::<Vec<_>>(),
                vec![0]
            );
            assert_consistent(&chronicle);
        }

        #[test]
        fn out_of_range_position_is_a_no_op() {
            let mut chronicle = chronicle_with(2);
            assert!(chronicle.delete_event(5).is_none());
            assert_eq!(chronicle.len(), 2);
        }
    }

    mod pagination {
        use super::*;

        #[test]
        fn pages_are_projected_from_the_history() {
            let mut chronicle = chronicle_with(1);
            for i in 1..12 {
                chronicle.add_version(
                    0,
                    narration(&format!("v{i}")),
                    VersionKind::Edit,
                    fixed_time(),
                );
            }
            assert_eq!(chronicle.history(0).unwrap().len(), 12);
            assert_eq!(chronicle.history_page_count(0, 5), 3);
            assert_eq!(chronicle.history_page(0, 2, 5).len(), 2);
            assert!(chronicle.history_page(0, 5, 5).is_empty());
        }

        #[test]
        fn missing_history_yields_empty_projections() {
            let chronicle = chronicle_with(1);
            assert!(chronicle.history_page(0, 0, 5).is_empty());
            assert_eq!(chronicle.history_page_count(0, 5), 0);
        }
    }

    mod end_to_end {
        use super::*;

        #[test]
        fn edit_then_delete_event_discards_everything() {
            let mut chronicle = Chronicle::new();
            chronicle.push_event(StoryEvent::action("go north"));

            chronicle.add_version(
                0,
                StoryEvent::action("go east"),
                VersionKind::Edit,
                fixed_time(),
            );
            let history = chronicle.history(0).unwrap();
            assert_eq!(history.len(), 2);
            assert_eq!(history.current_index(), 1);
            assert_eq!(chronicle.event_at(0), Some(&StoryEvent::action("go east")));

            chronicle.delete_event(0);
            assert!(chronicle.is_empty());
            assert!(!chronicle.has_history(0));
        }

        #[test]
        fn serializes_as_sequence_plus_string_keyed_map() {
            let mut chronicle = chronicle_with(3);
            chronicle.add_version(2, narration("edited"), VersionKind::Edit, fixed_time());

            let json = serde_json::to_value(&chronicle).unwrap();
            assert!(json["events"].is_array());
            assert!(json["histories"]["2"].is_object());

            let back: Chronicle = serde_json::from_value(json).unwrap();
            assert_eq!(back, chronicle);
            assert_consistent(&back);
        }
    }
}
