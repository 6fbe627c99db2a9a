//! Villager definitions: who they are, where they live, what their day is.

use serde::{Deserialize, Serialize};

use crate::grid::WorldPos;
use crate::schedule::Schedule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcRole {
    #[default]
    Citizen,
    Shopkeeper,
    Guard,
    Child,
}

/// Everything needed to spawn a villager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcProfile {
    pub name: String,
    #[serde(default)]
    pub role: NpcRole,
    /// Reference point the villager walks back to at night.
    pub home: WorldPos,
    #[serde(default)]
    pub schedule: Schedule,
    /// Overrides the configured NPC speed.
    #[serde(default)]
    pub move_speed: Option<f32>,
}

impl NpcProfile {
    pub fn new(name: impl Into<String>, home: WorldPos, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            role: NpcRole::Citizen,
            home,
            schedule,
            move_speed: None,
        }
    }

    pub fn with_role(mut self, role: NpcRole) -> Self {
        self.role = role;
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.move_speed = Some(speed);
        self
    }
}
