//! Error types for port operations.

/// Errors from the external story generation collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// The in-flight request was cancelled. A distinguished outcome, not a
    /// failure: callers must not surface it as an error.
    #[error("Generation cancelled")]
    Cancelled,

    /// Network or backend failure.
    #[error("Generation request failed: {0}")]
    RequestFailed(String),

    /// The backend answered, but not with a usable event.
    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors from snapshot persistence.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
