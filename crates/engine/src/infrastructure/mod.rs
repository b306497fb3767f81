//! Infrastructure: ports, clock, configuration, and persistence.

pub mod clock;
pub mod persistence;
pub mod ports;
pub mod settings;
