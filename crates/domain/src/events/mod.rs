//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. The engine layer uses these for tracing and for
//! deciding what to surface to the presentation layer.

pub mod chronicle_events;

pub use chronicle_events::ChronicleChange;
