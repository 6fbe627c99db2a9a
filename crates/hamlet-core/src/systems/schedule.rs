//! Schedule system - the per-villager daily state machine
//!
//! Every tick each villager resolves the current hour into a [`Directive`],
//! picks a target for it, keeps a route to that target, and recovers when
//! no route exists. Movement along the route happens in `movement_system`.

use hamlet_logic::config::SimConfig;
use hamlet_logic::error::NavError;
use hamlet_logic::grid::{Tilemap, WorldPos};
use hamlet_logic::pathfinding::find_path;
use hamlet_logic::poi::PoiRegistry;
use hamlet_logic::schedule::{Directive, Schedule};
use hecs::World;
use rand::Rng;

use crate::components::{AgentState, Brain, Home, Movement, Position, Routine};

/// Shared, read-only navigation resources handed to the schedule system.
#[derive(Clone, Copy)]
pub struct NavContext<'a> {
    pub tiles: &'a Tilemap,
    pub pois: &'a PoiRegistry,
    pub config: &'a SimConfig,
}

/// One villager's mutable view for a single tick.
struct Villager<'w> {
    position: WorldPos,
    home: WorldPos,
    schedule: &'w Schedule,
    movement: &'w mut Movement,
    brain: &'w mut Brain,
}

/// Advance every villager's state machine by one tick.
pub fn schedule_system(
    world: &mut World,
    nav: &NavContext<'_>,
    hour: f32,
    delta_seconds: f32,
    rng: &mut impl Rng,
) {
    for (entity, (pos, movement, brain, home, routine)) in
        world.query_mut::<(&Position, &mut Movement, &mut Brain, &Home, &Routine)>()
    {
        let previous = brain.state;
        let mut villager = Villager {
            position: pos.world,
            home: home.position,
            schedule: &routine.schedule,
            movement,
            brain,
        };
        think(nav, &mut villager, hour, delta_seconds, rng);

        if villager.brain.state != previous {
            log::debug!(
                "{:?}: {:?} -> {:?} (hour {:.2})",
                entity,
                previous,
                villager.brain.state,
                hour
            );
        }
    }
}

fn think(
    nav: &NavContext<'_>,
    v: &mut Villager<'_>,
    hour: f32,
    delta_seconds: f32,
    rng: &mut impl Rng,
) {
    let config = nav.config;
    let directive = resolve_directive(nav, v.schedule, hour);

    match directive {
        Directive::GoHome => {
            if !v.brain.going_home && !v.brain.at_home {
                let target = nav
                    .tiles
                    .random_walkable_near(v.home, config.home_search_radius, rng)
                    .unwrap_or(v.home);
                v.brain.set_target(target, v.movement);
                v.brain.going_home = true;
                v.brain.stuck = false;
            }
            v.brain.active_entry = None;
        }
        Directive::Visit { entry, kind } => {
            if v.brain.active_entry != Some(entry) {
                v.brain.begin_entry(entry);
                if let Some(poi) = nav.pois.closest(kind, v.position) {
                    let target = nav
                        .tiles
                        .random_walkable_near(poi.entry, config.poi_search_radius, rng)
                        .unwrap_or(poi.entry);
                    v.brain.set_target(target, v.movement);
                }
            }
        }
        Directive::FreeRoam { entry } => {
            if v.brain.active_entry != Some(entry) {
                v.brain.begin_entry(entry);
            }
            v.brain.free_roam_timer -= delta_seconds;
            let arrived = v.position.distance(&v.brain.target) < config.arrival_epsilon;
            if arrived || v.brain.free_roam_timer <= 0.0 {
                if let Some(target) = nav.tiles.random_walkable_position(rng) {
                    v.brain.set_target(target, v.movement);
                }
                v.brain.free_roam_timer = config.free_roam_cooldown;
            }
        }
    }

    if v.brain.going_home && v.position.distance(&v.brain.target) <= config.arrival_epsilon {
        v.brain.arrive_home();
        v.movement.follower.clear();
    }

    keep_route(nav, v);

    v.brain.state = derive_state(v.brain, directive);
}

/// Schedule directive with missing POI categories folded into `GoHome`.
fn resolve_directive(nav: &NavContext<'_>, schedule: &Schedule, hour: f32) -> Directive {
    match schedule.directive(hour, nav.config) {
        Directive::Visit { kind, .. } if !nav.pois.has_any(kind) => {
            log::trace!("{}", NavError::MissingPoi(kind));
            Directive::GoHome
        }
        directive => directive,
    }
}

/// Make sure a usable route to the target exists, entering stuck recovery
/// when none can be found.
fn keep_route(nav: &NavContext<'_>, v: &mut Villager<'_>) {
    let config = nav.config;
    let target = v.brain.target;

    if v.brain.at_home || v.position.distance(&target) <= config.arrival_epsilon {
        v.brain.stuck = false;
        return;
    }

    let follower = &v.movement.follower;
    if follower.is_active() && !follower.is_stale_for(target, config.route_stale_epsilon) {
        return;
    }

    match plan_route(nav.tiles, v.position, target, config) {
        Ok(route) => {
            v.movement.follower.set_route(route);
            v.brain.stuck = false;
        }
        Err(err) => {
            log::debug!("{}; starting stuck recovery", err);
            v.brain.stuck = true;
            v.movement.follower.clear();
            match nav
                .tiles
                .closest_walkable(v.position, config.unstuck_max_radius)
            {
                Ok(spot) => v.brain.set_target(spot, v.movement),
                Err(err) => log::warn!("stuck at {}: {}", v.position, err),
            }
        }
    }
}

/// A* route that ends exactly on `target`, not just on its cell centre.
pub(crate) fn plan_route(
    tiles: &Tilemap,
    from: WorldPos,
    target: WorldPos,
    config: &SimConfig,
) -> Result<Vec<WorldPos>, NavError> {
    let mut route = find_path(tiles, from, target).ok_or(NavError::NoPathFound {
        from: tiles.world_to_cell(from),
        to: tiles.world_to_cell(target),
    })?;
    let lands_on_target = route
        .last()
        .is_some_and(|last| last.distance(&target) <= config.route_stale_epsilon);
    if !lands_on_target {
        route.push(target);
    }
    Ok(route)
}

fn derive_state(brain: &Brain, directive: Directive) -> AgentState {
    if brain.at_home {
        AgentState::AtHome
    } else if brain.stuck {
        AgentState::Stuck
    } else if brain.going_home {
        AgentState::GoingHome
    } else {
        match directive {
            Directive::Visit { kind, .. } => AgentState::MovingToScheduled(kind),
            Directive::FreeRoam { .. } => AgentState::FreeRoaming,
            Directive::GoHome => AgentState::Idle,
        }
    }
}
