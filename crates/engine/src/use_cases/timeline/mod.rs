//! Timeline use cases: editing, version browsing, and deletion.
//!
//! Every operation here goes through the session's [`ChronicleHandle`], so
//! the timeline and the history store are always mutated together as one
//! atomic step. Domain-level rejections (out-of-range positions, missing
//! histories, deleting a sole version) surface as `Ok(false)` - they are
//! silent no-ops by contract, not errors.

use std::sync::Arc;

use talecraft_domain::{Chronicle, SessionId, StoryEvent, VersionEntry, VersionKind};

use crate::infrastructure::ports::ClockPort;
use crate::stores::{ChronicleHandle, ChronicleStore, HistoryPaneState};

/// Timeline operations, keyed by session.
pub struct TimelineOps {
    store: Arc<ChronicleStore>,
    clock: Arc<dyn ClockPort>,
    page_size: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),
}

impl TimelineOps {
    pub fn new(store: Arc<ChronicleStore>, clock: Arc<dyn ClockPort>, page_size: usize) -> Self {
        Self {
            store,
            clock,
            page_size,
        }
    }

    fn handle(&self, session: SessionId) -> Result<Arc<ChronicleHandle>, TimelineError> {
        self.store
            .get(session)
            .ok_or(TimelineError::SessionNotFound(session))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a new event to the end of the timeline, returning its
    /// position. This is the chat loop's write path.
    pub async fn append_event(
        &self,
        session: SessionId,
        event: StoryEvent,
    ) -> Result<usize, TimelineError> {
        let handle = self.handle(session)?;
        let position = handle
            .apply(move |s| {
                s.chronicle.push_event(event);
                s.chronicle.len() - 1
            })
            .await;
        tracing::debug!(%session, position, "appended event");
        Ok(position)
    }

    /// Replace the event at `position` with user-authored content, recording
    /// the replacement as a new `edit` version. Seeds the history from the
    /// old content first, so nothing is lost.
    pub async fn edit_event(
        &self,
        session: SessionId,
        position: usize,
        event: StoryEvent,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        let now = self.clock.now();
        let edited = handle
            .apply(move |s| {
                s.chronicle
                    .add_version(position, event, VersionKind::Edit, now)
                    .is_some()
            })
            .await;
        if edited {
            tracing::debug!(%session, position, "edited event");
        }
        Ok(edited)
    }

    /// Point the history at `position` back to an older (or newer) version
    /// and mirror it into the timeline. Keeps every version.
    pub async fn restore_version(
        &self,
        session: SessionId,
        position: usize,
        version_index: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        let restored = handle
            .apply(move |s| s.chronicle.select_version(position, version_index).is_some())
            .await;
        if restored {
            tracing::debug!(%session, position, version_index, "restored version");
        }
        Ok(restored)
    }

    /// Delete one version from the history at `position`. Deleting the sole
    /// remaining version is a no-op.
    pub async fn delete_version(
        &self,
        session: SessionId,
        position: usize,
        version_index: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        let deleted = handle
            .apply(move |s| s.chronicle.delete_version(position, version_index).is_some())
            .await;
        if deleted {
            tracing::debug!(%session, position, version_index, "deleted version");
        }
        Ok(deleted)
    }

    /// Delete the event at `position` along with its entire history,
    /// shifting every later event (and its history key) down by one.
    ///
    /// The open history pane follows the shift: a pane on the deleted event
    /// closes, a pane on a later event stays attached to the same logical
    /// event.
    pub async fn delete_event(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        let deleted = handle
            .apply(move |s| {
                let deleted = s.chronicle.delete_event(position).is_some();
                if deleted {
                    s.history_pane = match s.history_pane {
                        Some(pane) if pane.event_index == position => None,
                        Some(pane) if pane.event_index > position => Some(HistoryPaneState {
                            event_index: pane.event_index - 1,
                            ..pane
                        }),
                        other => other,
                    };
                }
                deleted
            })
            .await;
        if deleted {
            tracing::debug!(%session, position, "deleted event");
        }
        Ok(deleted)
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    pub async fn snapshot(&self, session: SessionId) -> Result<Chronicle, TimelineError> {
        let handle = self.handle(session)?;
        Ok(handle.read(|s| s.chronicle.clone()).await)
    }

    pub async fn event_at(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<Option<StoryEvent>, TimelineError> {
        let handle = self.handle(session)?;
        Ok(handle.read(move |s| s.chronicle.event_at(position).cloned()).await)
    }

    pub async fn has_history(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        Ok(handle.read(move |s| s.chronicle.has_history(position)).await)
    }

    /// One page of version entries, cloned out of the state lock.
    pub async fn history_page(
        &self,
        session: SessionId,
        position: usize,
        page: usize,
    ) -> Result<Vec<VersionEntry>, TimelineError> {
        let handle = self.handle(session)?;
        let page_size = self.page_size;
        Ok(handle
            .read(move |s| s.chronicle.history_page(position, page, page_size).to_vec())
            .await)
    }

    pub async fn history_page_count(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<usize, TimelineError> {
        let handle = self.handle(session)?;
        let page_size = self.page_size;
        Ok(handle
            .read(move |s| s.chronicle.history_page_count(position, page_size))
            .await)
    }

    // =========================================================================
    // History pane state
    // =========================================================================

    /// Open the history viewer on `position` at page 0. Returns `false`
    /// (and leaves any open pane alone) if no event lives there.
    pub async fn open_history(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        let page_size = self.page_size;
        Ok(handle
            .apply(move |s| {
                if s.chronicle.event_at(position).is_none() {
                    return false;
                }
                s.history_pane = Some(HistoryPaneState {
                    event_index: position,
                    page: 0,
                    page_size,
                });
                true
            })
            .await)
    }

    /// Change the open pane's page. A no-op when no pane is open;
    /// out-of-range pages simply project empty slices.
    pub async fn set_history_page(
        &self,
        session: SessionId,
        page: usize,
    ) -> Result<bool, TimelineError> {
        let handle = self.handle(session)?;
        Ok(handle
            .apply(move |s| match &mut s.history_pane {
                Some(pane) => {
                    pane.page = page;
                    true
                }
                None => false,
            })
            .await)
    }

    pub async fn close_history(&self, session: SessionId) -> Result<(), TimelineError> {
        let handle = self.handle(session)?;
        handle.apply(|s| s.history_pane = None).await;
        Ok(())
    }

    pub async fn history_pane(
        &self,
        session: SessionId,
    ) -> Result<Option<HistoryPaneState>, TimelineError> {
        let handle = self.handle(session)?;
        Ok(handle.read(|s| s.history_pane).await)
    }
}
