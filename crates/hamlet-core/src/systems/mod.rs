//! Systems - logic that operates on components
//!
//! Run order each tick: schedule, then movement, then visibility.

mod movement;
mod schedule;
mod visibility;

pub use movement::*;
pub use schedule::*;
pub use visibility::*;
