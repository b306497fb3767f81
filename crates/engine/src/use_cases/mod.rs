//! Use cases - the operations the presentation layer drives.

pub mod regeneration;
pub mod timeline;

pub use regeneration::{RegenerationError, RegenerationOps, RegenerationOutcome};
pub use timeline::{TimelineError, TimelineOps};
