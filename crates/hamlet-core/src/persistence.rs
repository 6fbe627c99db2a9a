//! Save/Load functionality for persisting simulation state
//!
//! Only where each agent stands and the clock are saved, encoded with
//! bincode. Everything else (targets, routes, schedule progress) is derived
//! again from the restored positions on the next tick.

use hamlet_logic::grid::WorldPos;
use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use thiserror::Error;

use crate::components::*;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Who a saved position belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentKey {
    /// A villager, matched by name on load
    Npc(String),
    Player,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub key: AgentKey,
    pub position: WorldPos,
}

/// Serializable snapshot of the simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in hours
    pub sim_time: f64,
    pub agents: Vec<SavedAgent>,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Collect agent positions from the world
pub fn snapshot(world: &World, sim_time: f64) -> SaveData {
    let mut agents = Vec::new();
    for (_entity, (pos, name)) in world.query::<(&Position, &Name)>().with::<&Npc>().iter() {
        agents.push(SavedAgent {
            key: AgentKey::Npc(name.0.clone()),
            position: pos.world,
        });
    }
    for (_entity, pos) in world.query::<&Position>().with::<&Player>().iter() {
        agents.push(SavedAgent {
            key: AgentKey::Player,
            position: pos.world,
        });
    }
    SaveData {
        version: SAVE_VERSION,
        sim_time,
        agents,
    }
}

/// Save simulation state to a writer
pub fn save_simulation<W: Write>(writer: W, world: &World, sim_time: f64) -> Result<(), SaveError> {
    let data = snapshot(world, sim_time);
    bincode::serialize_into(writer, &data)?;
    log::info!(
        "Saved {} agents at hour {:.2}",
        data.agents.len(),
        data.sim_time
    );
    Ok(())
}

/// Load simulation state from a reader
pub fn load_simulation<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }
    Ok(data)
}

/// Move matching agents to their saved positions and forget their plans.
///
/// Returns how many saved agents found a match. Saved villagers that no
/// longer exist are skipped.
pub fn apply_save(world: &mut World, data: &SaveData) -> usize {
    let mut restored = 0;
    for saved in &data.agents {
        let Some(entity) = find_agent(world, &saved.key) else {
            log::warn!("Saved agent {:?} not found; skipping", saved.key);
            continue;
        };
        if let Ok(mut pos) = world.get::<&mut Position>(entity) {
            pos.world = saved.position;
        }
        if let Ok(mut movement) = world.get::<&mut Movement>(entity) {
            movement.follower.clear();
        }
        if let Ok(mut motion) = world.get::<&mut Motion>(entity) {
            motion.moving = false;
        }
        if let Ok(mut brain) = world.get::<&mut Brain>(entity) {
            *brain = Brain::new(saved.position);
        }
        restored += 1;
    }
    restored
}

fn find_agent(world: &World, key: &AgentKey) -> Option<hecs::Entity> {
    match key {
        AgentKey::Npc(wanted) => world
            .query::<&Name>()
            .with::<&Npc>()
            .iter()
            .find(|(_, name)| name.0 == *wanted)
            .map(|(entity, _)| entity),
        AgentKey::Player => world
            .query::<&Player>()
            .iter()
            .next()
            .map(|(entity, _)| entity),
    }
}
