//! Application state and composition.

use std::sync::Arc;

use talecraft_domain::SessionId;

use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::persistence::JsonSnapshotRepo;
use crate::infrastructure::ports::{ClockPort, SnapshotError, StorytellerPort};
use crate::infrastructure::settings::EngineSettings;
use crate::stores::{ChronicleSession, ChronicleStore};
use crate::use_cases::{RegenerationOps, TimelineOps};

/// Main application state.
///
/// Holds the session store, use cases, and snapshot persistence. The
/// presentation layer drives everything through this struct.
pub struct StoryApp {
    pub store: Arc<ChronicleStore>,
    pub timeline: TimelineOps,
    pub regeneration: Arc<RegenerationOps>,
    pub snapshots: JsonSnapshotRepo,
}

impl StoryApp {
    pub fn new(storyteller: Arc<dyn StorytellerPort>, settings: EngineSettings) -> Self {
        Self::with_clock(storyteller, Arc::new(SystemClock::new()), settings)
    }

    pub fn with_clock(
        storyteller: Arc<dyn StorytellerPort>,
        clock: Arc<dyn ClockPort>,
        settings: EngineSettings,
    ) -> Self {
        let store = Arc::new(ChronicleStore::new());
        let timeline = TimelineOps::new(store.clone(), clock.clone(), settings.history_page_size);
        let regeneration = Arc::new(RegenerationOps::new(store.clone(), storyteller, clock));
        let snapshots = JsonSnapshotRepo::new(settings.snapshot_dir);
        Self {
            store,
            timeline,
            regeneration,
            snapshots,
        }
    }

    /// Persist a session's chronicle. Returns `false` for an unknown
    /// session. Transient pane state is not written.
    pub async fn save_session(&self, session: SessionId) -> Result<bool, SnapshotError> {
        let Some(handle) = self.store.get(session) else {
            return Ok(false);
        };
        let chronicle = handle.read(|s| s.chronicle.clone()).await;
        self.snapshots.save(session, &chronicle).await?;
        Ok(true)
    }

    /// Load a session's chronicle from its snapshot into the store,
    /// replacing any in-memory state for that session. Returns `false` if no
    /// snapshot exists.
    pub async fn load_session(&self, session: SessionId) -> Result<bool, SnapshotError> {
        match self.snapshots.load(session).await? {
            Some(chronicle) => {
                self.store
                    .insert_session(session, ChronicleSession::with_chronicle(chronicle));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
