//! Snapshot persistence for chronicles.

pub mod snapshots;

pub use snapshots::JsonSnapshotRepo;
