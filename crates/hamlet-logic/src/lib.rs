//! Pure navigation and scheduling logic for Hamlet.
//!
//! This crate contains the village rules that are independent of any ECS or
//! engine. Functions take plain data and return results, making them
//! unit-testable and reusable by both the NPC simulation and player
//! click-to-move input.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Tuning values loaded from JSON, with validation |
//! | [`constants`] | Default hours, radii, speeds and epsilons |
//! | [`error`] | Recoverable navigation and config errors |
//! | [`follower`] | Walking a route one tick at a time |
//! | [`grid`] | Cells, world positions, walkability oracle |
//! | [`pathfinding`] | A* over the 4-connected tile grid |
//! | [`poi`] | Points of interest and the category registry |
//! | [`schedule`] | Daily schedule windows and hour → directive |
//! | [`villager`] | Villager roles and spawn profiles |

pub mod config;
pub mod constants;
pub mod error;
pub mod follower;
pub mod grid;
pub mod pathfinding;
pub mod poi;
pub mod schedule;
pub mod villager;
