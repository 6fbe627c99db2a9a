//! Integration tests for the navigation pipeline without any ECS.
//!
//! Exercises: SimConfig JSON → NpcProfile JSON → Schedule directives
//! → PoiRegistry lookup → A* route → PathFollower walk.
//!
//! All tests are pure logic, no engine or world.

use hamlet_logic::config::SimConfig;
use hamlet_logic::error::NavError;
use hamlet_logic::follower::PathFollower;
use hamlet_logic::grid::{Cell, GridLayout, Tilemap, WorldPos};
use hamlet_logic::pathfinding::{find_path, manhattan};
use hamlet_logic::poi::{Poi, PoiKind, PoiRegistry};
use hamlet_logic::schedule::Directive;
use hamlet_logic::villager::{NpcProfile, NpcRole};

// ── Helpers ────────────────────────────────────────────────────────────

const VILLAGE: &[&str] = &[
    "................",
    "..####....####..",
    "..#..#....#..#..",
    "..####....####..",
    "................",
    "................",
    "######.#########",
    "................",
];

fn village() -> Tilemap {
    Tilemap::from_ascii(GridLayout::default(), VILLAGE)
}

fn smith() -> NpcProfile {
    serde_json::from_str(
        r#"{
            "name": "Garret",
            "role": "Shopkeeper",
            "home": { "x": 1.5, "y": 7.5 },
            "schedule": [
                { "start_hour": 7.0, "end_hour": 12.0, "poi": "Blacksmith" },
                { "start_hour": 12.0, "end_hour": 13.0, "free_roam": true },
                { "start_hour": 13.0, "end_hour": 19.0, "poi": "Market" }
            ]
        }"#,
    )
    .unwrap()
}

/// Walk a route to the end, returning the final position and tick count.
fn walk(route: Vec<WorldPos>, from: WorldPos, config: &SimConfig) -> (WorldPos, usize) {
    let mut follower = PathFollower::new();
    follower.set_route(route);
    let mut pos = from;
    for tick in 1..=10_000 {
        let step = follower.step(pos, config.npc_move_speed, 0.05, config.waypoint_epsilon);
        pos = step.position;
        if step.finished {
            return (pos, tick);
        }
    }
    panic!("route never finished");
}

// ── Schedule ───────────────────────────────────────────────────────────

#[test]
fn test_profile_drives_directives_through_the_day() {
    let config = SimConfig::from_json(r#"{ "night_start_hour": 20.0 }"#).unwrap();
    let profile = smith();
    assert_eq!(profile.role, NpcRole::Shopkeeper);
    assert!(profile.schedule.validate().is_empty());

    let schedule = &profile.schedule;
    assert_eq!(schedule.directive(5.0, &config), Directive::GoHome);
    assert_eq!(
        schedule.directive(9.0, &config),
        Directive::Visit {
            entry: 0,
            kind: PoiKind::Blacksmith
        }
    );
    assert_eq!(
        schedule.directive(12.5, &config),
        Directive::FreeRoam { entry: 1 }
    );
    assert_eq!(
        schedule.directive(18.9, &config),
        Directive::Visit {
            entry: 2,
            kind: PoiKind::Market
        }
    );
    // Gap between the last entry and nightfall
    assert_eq!(schedule.directive(19.5, &config), Directive::GoHome);
    assert_eq!(schedule.directive(20.0, &config), Directive::GoHome);
}

// ── Routing ────────────────────────────────────────────────────────────

#[test]
fn test_home_to_poi_route_is_walkable_and_shortest() {
    let tiles = village();
    let config = SimConfig::default();
    let pois = PoiRegistry::new();
    pois.register(Poi::new(1, PoiKind::Blacksmith, WorldPos::new(12.5, 4.5)));
    pois.register(Poi::new(2, PoiKind::Market, WorldPos::new(7.5, 0.5)));

    let profile = smith();
    let forge = pois.closest(PoiKind::Blacksmith, profile.home).unwrap();
    let route = find_path(&tiles, profile.home, forge.entry).unwrap();

    // Every waypoint stands on a walkable cell and neighbours the previous one
    let mut prev = tiles.world_to_cell(profile.home);
    for waypoint in &route {
        let cell = tiles.world_to_cell(*waypoint);
        assert!(tiles.is_walkable(cell), "{} is blocked", cell);
        assert_eq!(manhattan(prev, cell), 1);
        prev = cell;
    }
    assert_eq!(prev, Cell::new(12, 4));

    // Only way north is the gap at x = 6
    assert!(route.iter().any(|p| tiles.world_to_cell(*p) == Cell::new(6, 6)));
    let detour = manhattan(Cell::new(1, 7), Cell::new(6, 6)) + manhattan(Cell::new(6, 6), Cell::new(12, 4));
    assert_eq!(route.len() as u32, detour);

    let (end, ticks) = walk(route, profile.home, &config);
    assert!(end.distance(&forge.entry) < config.waypoint_epsilon);
    assert!(ticks > 1);
}

#[test]
fn test_house_interiors_are_unreachable() {
    let tiles = village();
    // (3, 2) is painted ground walled in by the house
    assert!(tiles.is_walkable(Cell::new(3, 2)));
    assert!(find_path(&tiles, WorldPos::new(0.5, 0.5), WorldPos::new(3.5, 2.5)).is_none());

    // Recovery from inside a wall lands on the nearest open ground
    let from_wall = WorldPos::new(2.5, 1.5);
    let spot = tiles.closest_walkable(from_wall, 20).unwrap();
    assert!(spot.distance(&from_wall) <= 1.0 + 1e-4);
    assert!(tiles.is_walkable_at(spot));
}

#[test]
fn test_recovery_gives_up_on_empty_map() {
    let tiles = Tilemap::new(GridLayout::default());
    let err = tiles.closest_walkable(WorldPos::new(3.5, 3.5), 20).unwrap_err();
    assert_eq!(
        err,
        NavError::NoWalkableCell {
            origin: Cell::new(3, 3),
            radius: 20
        }
    );
}

#[test]
fn test_unregistered_poi_is_gone_from_lookups() {
    let pois = PoiRegistry::new();
    let shrine = Poi::new(4, PoiKind::Shrine, WorldPos::new(2.5, 2.5));
    pois.register(shrine);
    pois.register(shrine);
    assert_eq!(pois.count(PoiKind::Shrine), 1);

    pois.unregister(shrine.id);
    assert!(pois.closest(PoiKind::Shrine, WorldPos::ZERO).is_none());
    assert!(!pois.has_any(PoiKind::Shrine));
}
