//! Event regeneration: replacing a timeline event with a fresh model take.
//!
//! The controller has exactly one suspension point - the storyteller call.
//! State is mutated in two atomic steps around it: the history is seeded
//! *before* the call (so the current content survives a failure), and the
//! result is appended as a `regenerate` version *after* it. At most one
//! regeneration may be in flight per position; re-entrant calls are no-ops.
//!
//! A regeneration that resolves after its target event was deleted or moved
//! is applied against whatever position it was bound to. That race is an
//! accepted limitation; no reconciliation is attempted.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use talecraft_domain::{ChronicleChange, SessionId, VersionKind};

use crate::infrastructure::ports::{
    ClockPort, GenerationError, RegenerationContext, StorytellerPort,
};
use crate::stores::{ChronicleHandle, ChronicleStore};

/// How a regeneration request ended. Only genuine generation failures are
/// errors; everything here is a normal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenerationOutcome {
    /// A new version was appended and mirrored into the timeline.
    Completed { version_index: usize },
    /// The generation call was cancelled; nothing was mutated.
    Cancelled,
    /// A regeneration for this position is already in flight.
    AlreadyInFlight,
    /// No event lives at the requested position (any longer).
    InvalidPosition,
}

#[derive(Debug, thiserror::Error)]
pub enum RegenerationError {
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// A non-cancellation generation failure, surfaced to the caller for
    /// reporting. The pre-generation history seed is preserved.
    #[error(transparent)]
    Generation(GenerationError),
}

/// Regeneration controller.
pub struct RegenerationOps {
    store: Arc<ChronicleStore>,
    storyteller: Arc<dyn StorytellerPort>,
    clock: Arc<dyn ClockPort>,
    in_flight: DashMap<(SessionId, usize), CancellationToken>,
}

impl RegenerationOps {
    pub fn new(
        store: Arc<ChronicleStore>,
        storyteller: Arc<dyn StorytellerPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            store,
            storyteller,
            clock,
            in_flight: DashMap::new(),
        }
    }

    /// Regenerate the event at `position`, appending the result as a new
    /// `regenerate` version.
    pub async fn regenerate(
        &self,
        session: SessionId,
        position: usize,
    ) -> Result<RegenerationOutcome, RegenerationError> {
        let handle = self
            .store
            .get(session)
            .ok_or(RegenerationError::SessionNotFound(session))?;

        let token = CancellationToken::new();
        match self.in_flight.entry((session, position)) {
            Entry::Occupied(_) => {
                tracing::debug!(%session, position, "regeneration already in flight, ignoring");
                return Ok(RegenerationOutcome::AlreadyInFlight);
            }
            Entry::Vacant(slot) => {
                slot.insert(token.clone());
            }
        }

        let result = self.run(&handle, session, position, &token).await;
        self.in_flight.remove(&(session, position));
        result
    }

    async fn run(
        &self,
        handle: &ChronicleHandle,
        session: SessionId,
        position: usize,
        token: &CancellationToken,
    ) -> Result<RegenerationOutcome, RegenerationError> {
        // Seed the history before the suspension point so the current
        // content survives a failed or cancelled generation.
        let now = self.clock.now();
        let context = handle
            .apply(move |s| {
                s.chronicle.event_at(position)?;
                s.chronicle.ensure_history(position, now);
                Some(RegenerationContext {
                    events: s.chronicle.events().to_vec(),
                    position,
                })
            })
            .await;
        let Some(context) = context else {
            return Ok(RegenerationOutcome::InvalidPosition);
        };

        let generated = tokio::select! {
            () = token.cancelled() => {
                tracing::debug!(%session, position, "regeneration cancelled");
                return Ok(RegenerationOutcome::Cancelled);
            }
            result = self.storyteller.generate_event(context) => result,
        };

        match generated {
            Ok(event) => {
                let now = self.clock.now();
                let change = handle
                    .apply(move |s| {
                        s.chronicle
                            .add_version(position, event, VersionKind::Regenerate, now)
                    })
                    .await;
                match change {
                    Some(ChronicleChange::VersionAdded { version_index, .. }) => {
                        tracing::debug!(%session, position, version_index, "regenerated event");
                        Ok(RegenerationOutcome::Completed { version_index })
                    }
                    // The target event vanished while the call was in
                    // flight; there is nothing left to update.
                    _ => {
                        tracing::debug!(%session, position, "regeneration target no longer exists");
                        Ok(RegenerationOutcome::InvalidPosition)
                    }
                }
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!(%session, position, "regeneration cancelled by collaborator");
                Ok(RegenerationOutcome::Cancelled)
            }
            Err(e) => {
                tracing::warn!(%session, position, error = %e, "regeneration failed");
                Err(RegenerationError::Generation(e))
            }
        }
    }

    /// Cancel an in-flight regeneration. Returns whether one was running.
    pub fn cancel(&self, session: SessionId, position: usize) -> bool {
        match self.in_flight.get(&(session, position)) {
            Some(entry) => {
                entry.value().cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self, session: SessionId, position: usize) -> bool {
        self.in_flight.contains_key(&(session, position))
    }
}
