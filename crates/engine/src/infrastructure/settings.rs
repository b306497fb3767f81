//! Engine configuration.

use std::path::PathBuf;

use talecraft_domain::DEFAULT_HISTORY_PAGE_SIZE;

/// Operational settings for the engine. Values come from the host
/// application or, for convenience, from `TALECRAFT_*` environment
/// variables.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Versions per page in the history viewer.
    pub history_page_size: usize,
    /// Directory for JSON chronicle snapshots.
    pub snapshot_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            history_page_size: DEFAULT_HISTORY_PAGE_SIZE,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

impl EngineSettings {
    /// Read settings from the environment, falling back to defaults for
    /// anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let history_page_size = std::env::var("TALECRAFT_HISTORY_PAGE_SIZE")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(defaults.history_page_size);
        let snapshot_dir = std::env::var("TALECRAFT_SNAPSHOT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.snapshot_dir);
        Self {
            history_page_size,
            snapshot_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_history_viewer() {
        let settings = EngineSettings::default();
        assert_eq!(settings.history_page_size, 5);
        assert_eq!(settings.snapshot_dir, PathBuf::from("snapshots"));
    }
}
