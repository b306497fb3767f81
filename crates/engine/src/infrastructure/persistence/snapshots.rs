//! JSON file snapshots of session chronicles.
//!
//! A snapshot is the chronicle alone - plain nested data, one file per
//! session. Transient state (the open history pane, in-flight regeneration
//! guards) is never written.

use std::path::PathBuf;

use talecraft_domain::{Chronicle, SessionId};

use crate::infrastructure::ports::SnapshotError;

/// File-per-session JSON snapshot storage.
pub struct JsonSnapshotRepo {
    dir: PathBuf,
}

impl JsonSnapshotRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, session: SessionId) -> PathBuf {
        self.dir.join(format!("{session}.json"))
    }

    /// Write a snapshot atomically (temp file + rename).
    pub async fn save(
        &self,
        session: SessionId,
        chronicle: &Chronicle,
    ) -> Result<(), SnapshotError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_vec_pretty(chronicle)?;
        let path = self.path_for(session);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(%session, path = %path.display(), "saved chronicle snapshot");
        Ok(())
    }

    /// Load a snapshot, or `None` if the session has never been saved.
    pub async fn load(&self, session: SessionId) -> Result<Option<Chronicle>, SnapshotError> {
        let path = self.path_for(session);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Delete a session's snapshot. Returns whether a file existed.
    pub async fn delete(&self, session: SessionId) -> Result<bool, SnapshotError> {
        match tokio::fs::remove_file(self.path_for(session)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use talecraft_domain::{StoryEvent, VersionKind};

    fn sample_chronicle() -> Chronicle {
        let now = chrono::Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let mut chronicle = Chronicle::new();
        chronicle.push_event(StoryEvent::action("go north"));
        chronicle.push_event(StoryEvent::narration("The road narrows."));
        chronicle.add_version(1, StoryEvent::narration("The road ends."), VersionKind::Edit, now);
        chronicle
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepo::new(dir.path());
        let session = SessionId::new();
        let chronicle = sample_chronicle();

        repo.save(session, &chronicle).await.unwrap();
        let loaded = repo.load(session).await.unwrap();
        assert_eq!(loaded, Some(chronicle));
    }

    #[tokio::test]
    async fn load_of_unknown_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepo::new(dir.path());
        assert_eq!(repo.load(SessionId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepo::new(dir.path());
        let session = SessionId::new();

        repo.save(session, &Chronicle::new()).await.unwrap();
        let chronicle = sample_chronicle();
        repo.save(session, &chronicle).await.unwrap();

        assert_eq!(repo.load(session).await.unwrap(), Some(chronicle));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_snapshot_existed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSnapshotRepo::new(dir.path());
        let session = SessionId::new();

        assert!(!repo.delete(session).await.unwrap());
        repo.save(session, &Chronicle::new()).await.unwrap();
        assert!(repo.delete(session).await.unwrap());
        assert_eq!(repo.load(session).await.unwrap(), None);
    }
}
