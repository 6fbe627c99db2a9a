//! Villager and player components: Npc, Player, Home, Routine, Brain.

use hamlet_logic::grid::WorldPos;
use hamlet_logic::poi::PoiKind;
use hamlet_logic::schedule::Schedule;
use hamlet_logic::villager::NpcRole;
use serde::{Deserialize, Serialize};

use super::Movement;

/// Marker component identifying a scheduled villager
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Npc {
    pub role: NpcRole,
}

/// Marker component for the click-to-move player character
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// Reference point a villager returns to at night
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Home {
    pub position: WorldPos,
}

/// A villager's daily schedule
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Routine {
    pub schedule: Schedule,
}

/// Observable state of the schedule state machine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Idle,
    AtHome,
    MovingToScheduled(PoiKind),
    FreeRoaming,
    GoingHome,
    Stuck,
}

/// Per-villager schedule state machine data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brain {
    /// Where the villager is currently heading
    pub target: WorldPos,
    /// Index of the schedule entry being carried out
    pub active_entry: Option<usize>,
    pub going_home: bool,
    pub at_home: bool,
    /// Seconds left before free-roam picks a new spot
    pub free_roam_timer: f32,
    /// Last route request failed and recovery is in progress
    pub stuck: bool,
    pub state: AgentState,
}

impl Brain {
    pub fn new(target: WorldPos) -> Self {
        Self {
            target,
            active_entry: None,
            going_home: false,
            at_home: false,
            free_roam_timer: 0.0,
            stuck: false,
            state: AgentState::Idle,
        }
    }

    pub fn with_entry(mut self, entry: Option<usize>) -> Self {
        self.active_entry = entry;
        self
    }

    /// Point the villager somewhere else. Any route toward the old target
    /// is dropped, so the next tick plans from scratch.
    pub fn set_target(&mut self, target: WorldPos, movement: &mut Movement) {
        if self.target != target {
            self.target = target;
            movement.follower.clear();
        }
    }

    /// Adopt a new schedule entry, leaving home behind.
    pub fn begin_entry(&mut self, entry: usize) {
        self.active_entry = Some(entry);
        self.free_roam_timer = 0.0;
        self.going_home = false;
        self.at_home = false;
    }

    pub fn arrive_home(&mut self) {
        self.at_home = true;
        self.going_home = false;
        self.stuck = false;
        self.state = AgentState::AtHome;
    }
}
