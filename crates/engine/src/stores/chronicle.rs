//! Session state storage: one single-writer container per running story.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use talecraft_domain::{Chronicle, SessionId};

/// Transient viewer state: which history pane is open and its scroll
/// position. At most one pane is meaningful per session, and it is never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPaneState {
    pub event_index: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Mutable per-session state: the chronicle plus transient UI bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ChronicleSession {
    pub chronicle: Chronicle,
    pub history_pane: Option<HistoryPaneState>,
}

impl ChronicleSession {
    pub fn with_chronicle(chronicle: Chronicle) -> Self {
        Self {
            chronicle,
            history_pane: None,
        }
    }
}

/// Single-writer handle over one session's state.
///
/// All mutations go through [`ChronicleHandle::apply`] or
/// [`ChronicleHandle::update`] and are serialized through a fair mutex:
/// concurrent callers queue and run in submission order, never interleaved.
/// Each update runs against a working copy of the state and is committed
/// only when the mutator finishes; a mutator that errors leaves the session
/// exactly as it was.
pub struct ChronicleHandle {
    state: Mutex<ChronicleSession>,
}

impl ChronicleHandle {
    pub fn new(session: ChronicleSession) -> Self {
        Self {
            state: Mutex::new(session),
        }
    }

    /// Read a projection of the current state.
    pub async fn read<T>(&self, project: impl FnOnce(&ChronicleSession) -> T) -> T {
        let guard = self.state.lock().await;
        project(&guard)
    }

    /// Clone of the full session state.
    pub async fn snapshot(&self) -> ChronicleSession {
        self.read(Clone::clone).await
    }

    /// Apply an infallible mutator as one atomic step.
    pub async fn apply<T>(&self, mutate: impl FnOnce(&mut ChronicleSession) -> T) -> T {
        let mut guard = self.state.lock().await;
        let mut draft = guard.clone();
        let value = mutate(&mut draft);
        *guard = draft;
        value
    }

    /// Apply a fallible mutator as one atomic step: on `Ok` the draft is
    /// committed, on `Err` it is discarded and the error propagates.
    pub async fn update<T, E>(
        &self,
        mutate: impl FnOnce(&mut ChronicleSession) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut guard = self.state.lock().await;
        let mut draft = guard.clone();
        let value = mutate(&mut draft)?;
        *guard = draft;
        Ok(value)
    }
}

/// All live sessions, keyed by session id.
#[derive(Default)]
pub struct ChronicleStore {
    sessions: DashMap<SessionId, Arc<ChronicleHandle>>,
}

impl ChronicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session and return its id.
    pub fn create_session(&self) -> SessionId {
        let id = SessionId::new();
        self.sessions.insert(
            id,
            Arc::new(ChronicleHandle::new(ChronicleSession::default())),
        );
        id
    }

    /// Insert (or replace) a session with pre-built state, e.g. loaded from
    /// a snapshot.
    pub fn insert_session(&self, id: SessionId, session: ChronicleSession) {
        self.sessions
            .insert(id, Arc::new(ChronicleHandle::new(session)));
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<ChronicleHandle>> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
