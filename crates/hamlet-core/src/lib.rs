//! Hamlet Core - Village NPC Simulation Engine
//!
//! An ECS-based simulation of a small tile-map village whose villagers walk
//! a daily schedule: off to the market in the morning, wandering the square
//! in the afternoon, home at night. A click-to-move player shares the same
//! pathfinder.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Villagers and the player
//! - **Components**: Pure data attached to entities (Position, Movement, Brain, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! The map, POI registry and tuning live outside the world in
//! [`engine::SimulationEngine`] and are passed to systems by reference.
//!
//! # Example
//!
//! ```rust,no_run
//! use hamlet_core::prelude::*;
//! use hamlet_logic::config::SimConfig;
//! use hamlet_logic::grid::{GridLayout, Tilemap};
//!
//! let tiles = Tilemap::from_ascii(GridLayout::default(), &["....", "...."]);
//! let mut engine = SimulationEngine::new(SimConfig::default(), tiles);
//!
//! // Run simulation
//! loop {
//!     engine.update(1.0 / 60.0); // 60 FPS
//! }
//! ```

pub mod components;
pub mod engine;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{AgentView, CommandError, SimulationEngine};
    pub use hecs::Entity;
}
