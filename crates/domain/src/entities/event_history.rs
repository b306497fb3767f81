//! Version history for a single timeline position.
//!
//! An [`EventHistory`] keeps every version an event has ever had (oldest
//! first) plus a pointer to the version currently mirrored into the
//! timeline. Histories are created lazily on first edit or regeneration and
//! are never empty once created.
//!
//! # Invariants
//!
//! - `entries` is never empty
//! - `current_version_index < entries.len()`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::StoryEvent;

/// Default number of versions shown per page in the history viewer.
pub const DEFAULT_HISTORY_PAGE_SIZE: usize = 5;

/// How a version came to exist: user-authored or model-produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Edit,
    Regenerate,
}

/// One historical snapshot of an event. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    event: StoryEvent,
    timestamp: DateTime<Utc>,
    kind: VersionKind,
}

impl VersionEntry {
    pub fn new(event: StoryEvent, kind: VersionKind, now: DateTime<Utc>) -> Self {
        Self {
            event,
            timestamp: now,
            kind,
        }
    }

    pub fn event(&self) -> &StoryEvent {
        &self.event
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> VersionKind {
        self.kind
    }
}

/// Outcome of removing a version, telling the caller whether the live
/// timeline must be refreshed from the new current version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionRemoval {
    /// The removed version was current; the timeline must mirror the entry
    /// now at `new_current`.
    CurrentChanged { new_current: usize },
    /// A non-current version was removed; the live event is untouched.
    Unaffected,
}

/// Ordered version history plus the pointer to the live version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventHistory {
    entries: Vec<VersionEntry>,
    current_version_index: usize,
}

impl EventHistory {
    /// Create a one-entry history from content that is already live in the
    /// timeline. Provenance is inferred from the event kind.
    pub fn seeded(event: StoryEvent, now: DateTime<Utc>) -> Self {
        let kind = event.default_provenance();
        Self {
            entries: vec![VersionEntry::new(event, kind, now)],
            current_version_index: 0,
        }
    }

    /// Append a new version and make it current. Returns the new version's
    /// index.
    pub fn push(&mut self, event: StoryEvent, kind: VersionKind, now: DateTime<Utc>) -> usize {
        self.entries.push(VersionEntry::new(event, kind, now));
        self.current_version_index = self.entries.len() - 1;
        self.current_version_index
    }

    /// Move the current pointer to `index`, returning the newly current
    /// event. Out-of-range indices are ignored and return `None`.
    pub fn select(&mut self, index: usize) -> Option<&StoryEvent> {
        if index >= self.entries.len() {
            return None;
        }
        self.current_version_index = index;
        self.entries.get(index).map(VersionEntry::event)
    }

    /// Remove the version at `index`, adjusting the current pointer:
    ///
    /// - removing the current version moves the pointer to the previous
    ///   entry (or stays at 0) and requires a timeline refresh
    /// - removing an earlier version shifts the pointer down by one so the
    ///   same logical version stays current
    /// - removing a later version leaves the pointer alone
    ///
    /// Removing the sole remaining version is rejected: a history always
    /// retains at least one entry.
    pub fn remove(&mut self, index: usize) -> Option<VersionRemoval> {
        if self.entries.len() <= 1 || index >= self.entries.len() {
            return None;
        }
        self.entries.remove(index);
        if index == self.current_version_index {
            self.current_version_index = index.saturating_sub(1);
            Some(VersionRemoval::CurrentChanged {
                new_current: self.current_version_index,
            })
        } else {
            if index < self.current_version_index {
                self.current_version_index -= 1;
            }
            Some(VersionRemoval::Unaffected)
        }
    }

    pub fn entries(&self) -> &[VersionEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> usize {
        self.current_version_index
    }

    /// The live version. The never-empty invariant makes this total.
    pub fn current(&self) -> &VersionEntry {
        &self.entries[self.current_version_index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 0-based page of version entries. Out-of-range pages (and a page size
    /// of zero) yield an empty slice, never an error.
    pub fn page(&self, page: usize, page_size: usize) -> &[VersionEntry] {
        if page_size == 0 {
            return &[];
        }
        let start = match page.checked_mul(page_size) {
            Some(start) if start < self.entries.len() => start,
            _ => return &[],
        };
        let end = (start + page_size).min(self.entries.len());
        &self.entries[start..end]
    }

    /// Number of pages at the given page size.
    pub fn page_count(&self, page_size: usize) -> usize {
        if page_size == 0 {
            0
        } else {
            self.entries.len().div_ceil(page_size)
        }
    }
}
