//! Common components used by both villagers and the player.

use hamlet_logic::follower::{Facing, PathFollower};
use hamlet_logic::grid::WorldPos;
use serde::{Deserialize, Serialize};

/// Spatial position component - where an entity stands in the world
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub world: WorldPos,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            world: WorldPos::new(x, y),
        }
    }
}

impl From<WorldPos> for Position {
    fn from(world: WorldPos) -> Self {
        Self { world }
    }
}

/// Movement component - the route being walked and how fast
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movement {
    pub follower: PathFollower,
    /// World units per second
    pub speed: f32,
}

impl Movement {
    pub fn new(speed: f32) -> Self {
        Self {
            follower: PathFollower::new(),
            speed,
        }
    }
}

/// What rendering reads each tick to pick and flip a sprite
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Motion {
    pub facing: Facing,
    pub moving: bool,
}

/// Whether the entity should be drawn at all
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Visibility {
    pub visible: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Name component for entities that have names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
