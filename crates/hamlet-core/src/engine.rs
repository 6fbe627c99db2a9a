//! Simulation engine - main entry point for running the village

use hamlet_logic::config::SimConfig;
use hamlet_logic::error::NavError;
use hamlet_logic::follower::Facing;
use hamlet_logic::grid::{Tilemap, WorldPos};
use hamlet_logic::poi::{Poi, PoiId, PoiKind, PoiRegistry};
use hamlet_logic::schedule::Directive;
use hamlet_logic::villager::NpcProfile;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::components::*;
use crate::persistence::{self, SaveError};
use crate::systems::*;

/// Errors from direct movement commands
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Nav(#[from] NavError),
    /// Scheduled villagers are steered with `retarget`, not routes.
    #[error("entity {0:?} cannot take move commands")]
    NotMovable(Entity),
    #[error("entity {0:?} does not exist")]
    NoSuchEntity(Entity),
}

/// Everything rendering needs about one agent for the current tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentView {
    pub position: WorldPos,
    pub facing: Facing,
    pub moving: bool,
    pub visible: bool,
    /// `None` for the player
    pub state: Option<AgentState>,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing all agents
    pub world: World,
    /// Simulation time in hours since start
    pub sim_time: f64,
    tiles: Tilemap,
    pois: PoiRegistry,
    config: SimConfig,
    rng: StdRng,
    /// Game seconds per real second
    time_scale: f32,
}

impl SimulationEngine {
    /// Create an empty village on the given map
    pub fn new(config: SimConfig, tiles: Tilemap) -> Self {
        Self::with_rng(config, tiles, StdRng::from_entropy())
    }

    /// Same as `new` but with reproducible random choices
    pub fn with_seed(config: SimConfig, tiles: Tilemap, seed: u64) -> Self {
        Self::with_rng(config, tiles, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, tiles: Tilemap, rng: StdRng) -> Self {
        for issue in config.validate() {
            log::warn!("Config: {}", issue);
        }
        Self {
            world: World::new(),
            sim_time: 0.0,
            tiles,
            pois: PoiRegistry::new(),
            config,
            rng,
            time_scale: 1.0,
        }
    }

    /// Update the simulation by delta_seconds of real time.
    ///
    /// The clock advances by `delta_seconds * time_scale`; walking speed and
    /// free-roam cooldowns run on unscaled time.
    pub fn update(&mut self, delta_seconds: f32) {
        let game_seconds = delta_seconds * self.time_scale;
        self.sim_time += game_seconds as f64 / 3600.0;
        let hour = self.hour_of_day();

        let nav = NavContext {
            tiles: &self.tiles,
            pois: &self.pois,
            config: &self.config,
        };
        schedule_system(&mut self.world, &nav, hour, delta_seconds, &mut self.rng);
        movement_system(&mut self.world, &self.config, delta_seconds);
        visibility_system(&mut self.world);
    }

    /// Set time scale (1.0 = one game second per real second)
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Get current simulation time in hours
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Get current hour of day (0-24)
    pub fn hour_of_day(&self) -> f32 {
        self.sim_time.rem_euclid(24.0) as f32
    }

    /// Jump to `hour` on the current day
    pub fn set_hour(&mut self, hour: f32) {
        let day = (self.sim_time / 24.0).floor();
        self.sim_time = day * 24.0 + (hour as f64).rem_euclid(24.0);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tiles(&self) -> &Tilemap {
        &self.tiles
    }

    /// Edit the walkability layers; agents see the change on their next route.
    pub fn tiles_mut(&mut self) -> &mut Tilemap {
        &mut self.tiles
    }

    pub fn pois(&self) -> &PoiRegistry {
        &self.pois
    }

    pub fn register_poi(&self, poi: Poi) {
        log::debug!("Registered {} {:?} at {}", poi.kind.name(), poi.id, poi.entry);
        self.pois.register(poi);
    }

    pub fn unregister_poi(&self, id: PoiId) {
        self.pois.unregister(id);
    }

    /// Spawn a villager where its schedule says it should be right now:
    /// near the closest POI it is due at, otherwise at home.
    pub fn spawn_npc(&mut self, profile: NpcProfile) -> Entity {
        for (first, second) in profile.schedule.overlaps() {
            log::warn!(
                "{}: schedule entries {} and {} overlap, entry {} wins",
                profile.name,
                first,
                second,
                first
            );
        }

        let radius = self.config.spawn_search_radius;
        let directive = profile.schedule.directive(self.hour_of_day(), &self.config);
        let due_at = match directive {
            Directive::Visit { entry, kind } => self
                .pois
                .closest(kind, profile.home)
                .map(|poi| (entry, poi.entry)),
            _ => None,
        };

        match (due_at, directive) {
            (Some((entry, spot)), _) => {
                let start = self.near(spot, radius);
                self.spawn_villager(profile, start, Some(entry), false)
            }
            (None, Directive::FreeRoam { entry }) => {
                let start = self.near(profile.home, radius);
                self.spawn_villager(profile, start, Some(entry), false)
            }
            _ => {
                let start = self.near(profile.home, radius);
                self.spawn_villager(profile, start, None, true)
            }
        }
    }

    /// Spawn a villager at a random POI of `kind`, or at the origin if the
    /// village has none.
    pub fn spawn_npc_at_poi(&mut self, profile: NpcProfile, kind: PoiKind) -> Entity {
        let start = match self.pois.random(kind, &mut self.rng) {
            Some(poi) => self.near(poi.entry, self.config.spawn_search_radius),
            None => {
                log::warn!(
                    "No {} registered for {}; spawning at origin",
                    kind.name(),
                    profile.name
                );
                WorldPos::ZERO
            }
        };
        self.spawn_villager(profile, start, None, false)
    }

    fn near(&mut self, center: WorldPos, radius: i32) -> WorldPos {
        self.tiles
            .random_walkable_near(center, radius, &mut self.rng)
            .unwrap_or(center)
    }

    fn spawn_villager(
        &mut self,
        profile: NpcProfile,
        start: WorldPos,
        active_entry: Option<usize>,
        at_home: bool,
    ) -> Entity {
        let speed = profile.move_speed.unwrap_or(self.config.npc_move_speed);
        let mut brain = Brain::new(start).with_entry(active_entry);
        if at_home {
            brain.arrive_home();
        }
        log::info!("Spawned {} ({:?}) at {}", profile.name, profile.role, start);

        self.world.spawn((
            Npc { role: profile.role },
            Name(profile.name),
            Position { world: start },
            Movement::new(speed),
            Motion::default(),
            Visibility { visible: !at_home },
            Home {
                position: profile.home,
            },
            Routine {
                schedule: profile.schedule,
            },
            brain,
        ))
    }

    /// Spawn the click-to-move player
    pub fn spawn_player(&mut self, position: WorldPos) -> Entity {
        self.world.spawn((
            Player,
            Name::new("Player"),
            Position { world: position },
            Movement::new(self.config.player_move_speed),
            Motion::default(),
            Visibility::default(),
        ))
    }

    /// Send a non-scheduled agent (the player) to `destination`.
    ///
    /// Returns the number of waypoints in the new route.
    pub fn command_move(
        &mut self,
        entity: Entity,
        destination: WorldPos,
    ) -> Result<usize, CommandError> {
        if self.world.get::<&Brain>(entity).is_ok() {
            return Err(CommandError::NotMovable(entity));
        }
        let start = self
            .world
            .get::<&Position>(entity)
            .map(|pos| pos.world)
            .map_err(|_| CommandError::NoSuchEntity(entity))?;

        let goal = self.tiles.world_to_cell(destination);
        if !self.tiles.is_walkable(goal) {
            return Err(NavError::DestinationBlocked(goal).into());
        }
        let mut route = hamlet_logic::pathfinding::find_path(&self.tiles, start, destination)
            .ok_or(NavError::NoPathFound {
                from: self.tiles.world_to_cell(start),
                to: goal,
            })?;
        if route.is_empty() {
            route.push(self.tiles.cell_to_world_center(goal));
        }

        let len = route.len();
        let mut movement = self
            .world
            .get::<&mut Movement>(entity)
            .map_err(|_| CommandError::NotMovable(entity))?;
        movement.follower.set_route(route);
        Ok(len)
    }

    /// Point a villager at a new spot right away. During the day the schedule
    /// takes over again at its next entry change or at nightfall. While the
    /// schedule wants the villager home, the next tick sends them home again.
    pub fn retarget(&mut self, entity: Entity, target: WorldPos) -> bool {
        match self
            .world
            .query_one_mut::<(&mut Brain, &mut Movement)>(entity)
        {
            Ok((brain, movement)) => {
                brain.set_target(target, movement);
                brain.at_home = false;
                brain.going_home = false;
                brain.stuck = false;
                true
            }
            Err(_) => false,
        }
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity).is_ok()
    }

    pub fn agent_view(&self, entity: Entity) -> Option<AgentView> {
        let mut query = self
            .world
            .query_one::<(&Position, &Motion, &Visibility, Option<&Brain>)>(entity)
            .ok()?;
        query.get().map(|(pos, motion, visibility, brain)| AgentView {
            position: pos.world,
            facing: motion.facing,
            moving: motion.moving,
            visible: visibility.visible,
            state: brain.map(|b| b.state),
        })
    }

    pub fn npc_by_name(&self, name: &str) -> Option<Entity> {
        self.world
            .query::<(&Name, &Npc)>()
            .iter()
            .find(|(_, (n, _))| n.as_str() == name)
            .map(|(entity, _)| entity)
    }

    pub fn npc_count(&self) -> usize {
        self.world.query::<&Npc>().iter().count()
    }

    /// Save agent positions and the clock to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_simulation(writer, &self.world, self.sim_time)
    }

    /// Restore positions and the clock; returns how many agents were matched
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<usize, SaveError> {
        let data = persistence::load_simulation(reader)?;
        self.sim_time = data.sim_time;
        let restored = persistence::apply_save(&mut self.world, &data);
        log::info!(
            "Loaded {} of {} agents at hour {:.2}",
            restored,
            data.agents.len(),
            self.hour_of_day()
        );
        Ok(restored)
    }
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::new(SimConfig::default(), Tilemap::default())
    }
}
