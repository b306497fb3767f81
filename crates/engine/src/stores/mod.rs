//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong on disk:
//! - `ChronicleStore` - per-session chronicle handles
//! - `ChronicleHandle` - the single-writer state container for one session

pub mod chronicle;

pub use chronicle::{ChronicleHandle, ChronicleSession, ChronicleStore, HistoryPaneState};
