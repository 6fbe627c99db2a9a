//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior beyond small invariant-keeping helpers - the
//! per-tick logic lives in systems.

mod common;
mod people;

pub use common::*;
pub use people::*;
