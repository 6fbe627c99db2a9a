//! Hamlet Headless Simulation Harness
//!
//! Loads the sample village, runs a full day through the engine and checks
//! that every villager keeps their schedule and is home by night.
//! Runs entirely in-process, no rendering.
//!
//! Usage:
//!   cargo run -p hamlet-simtest
//!   cargo run -p hamlet-simtest -- --verbose
//!   RUST_LOG=hamlet_core=debug cargo run -p hamlet-simtest

use std::collections::{HashMap, HashSet};

use hamlet_core::prelude::*;
use hamlet_logic::config::SimConfig;
use hamlet_logic::error::NavError;
use hamlet_logic::grid::{GridLayout, Tilemap, WorldPos};
use hamlet_logic::pathfinding::find_path;
use hamlet_logic::poi::{Poi, PoiKind, PoiRegistry};
use hamlet_logic::schedule::Directive;
use hamlet_logic::villager::NpcProfile;
use serde::Deserialize;

// ── Village data ────────────────────────────────────────────────────────
const VILLAGE_JSON: &str = include_str!("../../../data/village.json");

#[derive(Debug, Deserialize)]
struct VillageData {
    map: Vec<String>,
    #[serde(default)]
    config: SimConfig,
    player: WorldPos,
    pois: Vec<Poi>,
    villagers: Vec<NpcProfile>,
}

impl VillageData {
    fn tiles(&self) -> Tilemap {
        let rows: Vec<&str> = self.map.iter().map(String::as_str).collect();
        Tilemap::from_ascii(GridLayout::default(), &rows)
    }
}

/// Game seconds per real second while simulating the day
const TIME_SCALE: f32 = 300.0;
const DT: f32 = 0.1;
const DAY_START: f32 = 5.0;
const DAY_END: f32 = 23.5;
/// Inside the market building
const MARKET_STALLS: WorldPos = WorldPos::new(11.5, 4.5);

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Hamlet Simulation Harness ===\n");

    let mut results = Vec::new();

    let village: VillageData = match serde_json::from_str(VILLAGE_JSON) {
        Ok(v) => v,
        Err(e) => {
            println!("  ✗ village_parse: JSON parse error: {}", e);
            std::process::exit(1);
        }
    };

    // 1. Village data sanity
    results.extend(validate_village_data(&village, verbose));

    // 2. Every scheduled POI reachable from home
    results.extend(validate_routes(&village, verbose));

    // 3. A full simulated day
    results.extend(simulate_day(&village, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Village data ─────────────────────────────────────────────────────

fn validate_village_data(village: &VillageData, verbose: bool) -> Vec<TestResult> {
    println!("--- Village Data ---");
    let mut results = Vec::new();
    let tiles = village.tiles();

    let issues = village.config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: issues.is_empty(),
        detail: if issues.is_empty() {
            "no issues".into()
        } else {
            issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    results.push(TestResult {
        name: "map_has_ground".into(),
        passed: !tiles.walkable_cells().is_empty(),
        detail: format!("{} walkable cells", tiles.walkable_cells().len()),
    });

    let blocked_pois: Vec<String> = village
        .pois
        .iter()
        .filter(|p| !tiles.is_walkable_at(p.entry))
        .map(|p| format!("{:?}@{}", p.kind, p.entry))
        .collect();
    results.push(TestResult {
        name: "poi_entries_walkable".into(),
        passed: blocked_pois.is_empty(),
        detail: format!("{} POIs, blocked: {:?}", village.pois.len(), blocked_pois),
    });

    let blocked_homes: Vec<&str> = village
        .villagers
        .iter()
        .filter(|v| !tiles.is_walkable_at(v.home))
        .map(|v| v.name.as_str())
        .collect();
    results.push(TestResult {
        name: "homes_walkable".into(),
        passed: blocked_homes.is_empty(),
        detail: format!("blocked: {:?}", blocked_homes),
    });

    let mut bad_schedules = Vec::new();
    for v in &village.villagers {
        let issues = v.schedule.validate();
        if !issues.is_empty() {
            bad_schedules.push(format!("{}: {:?}", v.name, issues));
        }
    }
    results.push(TestResult {
        name: "schedules_valid".into(),
        passed: bad_schedules.is_empty(),
        detail: if bad_schedules.is_empty() {
            format!("{} villagers", village.villagers.len())
        } else {
            bad_schedules.join("; ")
        },
    });

    if verbose {
        for kind in PoiKind::ALL {
            let count = village.pois.iter().filter(|p| p.kind == kind).count();
            println!("    {:10}: {} registered", kind.name(), count);
        }
    }

    results
}

// ── 2. Routes ───────────────────────────────────────────────────────────

fn validate_routes(village: &VillageData, verbose: bool) -> Vec<TestResult> {
    println!("--- Routes ---");
    let mut results = Vec::new();
    let tiles = village.tiles();
    let pois = PoiRegistry::new();
    for poi in &village.pois {
        pois.register(*poi);
    }

    let mut missing = Vec::new();
    let mut unreachable = Vec::new();
    let mut longest = 0;
    for v in &village.villagers {
        for entry in v.schedule.entries() {
            if entry.free_roam || entry.poi == PoiKind::None {
                continue;
            }
            let Some(poi) = pois.closest(entry.poi, v.home) else {
                missing.push(NavError::MissingPoi(entry.poi).to_string());
                continue;
            };
            match find_path(&tiles, v.home, poi.entry) {
                Some(route) => {
                    longest = longest.max(route.len());
                    if verbose {
                        println!(
                            "    {} → {}: {} steps",
                            v.name,
                            entry.poi.name(),
                            route.len()
                        );
                    }
                }
                None => unreachable.push(format!("{} → {}", v.name, entry.poi.name())),
            }
        }
    }

    results.push(TestResult {
        name: "scheduled_pois_exist".into(),
        passed: missing.is_empty(),
        detail: format!("missing: {:?}", missing),
    });
    results.push(TestResult {
        name: "scheduled_pois_reachable".into(),
        passed: unreachable.is_empty(),
        detail: format!("longest route {} steps, unreachable: {:?}", longest, unreachable),
    });

    results
}

// ── 3. Simulated day ────────────────────────────────────────────────────

fn simulate_day(village: &VillageData, verbose: bool) -> Vec<TestResult> {
    println!("--- Simulated Day ---");
    let mut results = Vec::new();

    let mut engine = SimulationEngine::with_seed(village.config.clone(), village.tiles(), 7);
    for poi in &village.pois {
        engine.register_poi(*poi);
    }
    engine.set_hour(DAY_START);
    engine.set_time_scale(TIME_SCALE);

    let villagers: Vec<_> = village
        .villagers
        .iter()
        .map(|p| (p.name.clone(), engine.spawn_npc(p.clone())))
        .collect();
    let player = engine.spawn_player(village.player);

    results.push(TestResult {
        name: "spawned_all".into(),
        passed: engine.npc_count() == village.villagers.len(),
        detail: format!("{} villagers", engine.npc_count()),
    });

    // Click-to-move: blocked cell first, then a real destination
    let blocked = engine.command_move(player, MARKET_STALLS);
    results.push(TestResult {
        name: "player_click_blocked".into(),
        passed: matches!(
            blocked,
            Err(CommandError::Nav(NavError::DestinationBlocked(_)))
        ),
        detail: format!("{:?}", blocked),
    });

    let player_goal = WorldPos::new(21.5, 6.5);
    let player_route = engine.command_move(player, player_goal);
    results.push(TestResult {
        name: "player_click_routed".into(),
        passed: player_route.is_ok(),
        detail: format!("{:?}", player_route),
    });

    // Per-villager bookkeeping
    let mut reached: HashSet<(String, PoiKind)> = HashSet::new();
    let mut stuck_run: HashMap<String, usize> = HashMap::new();
    let mut worst_stuck: HashMap<String, usize> = HashMap::new();
    let mut hidden_mismatch = 0usize;
    let mut ticks = 0usize;

    while engine.hour_of_day() < DAY_END {
        engine.update(DT);
        ticks += 1;

        for (name, entity) in &villagers {
            let Some(view) = engine.agent_view(*entity) else {
                continue;
            };
            match view.state {
                Some(AgentState::MovingToScheduled(kind)) => {
                    let near = engine
                        .pois()
                        .closest(kind, view.position)
                        .map(|poi| poi.entry.distance(&view.position))
                        .unwrap_or(f32::MAX);
                    let radius = engine.config().poi_search_radius as f32 * 2f32.sqrt() + 0.1;
                    if near <= radius {
                        reached.insert((name.clone(), kind));
                    }
                }
                Some(AgentState::Stuck) => {
                    let run = stuck_run.entry(name.clone()).or_default();
                    *run += 1;
                    let worst = worst_stuck.entry(name.clone()).or_default();
                    *worst = (*worst).max(*run);
                }
                _ => {}
            }
            if view.state != Some(AgentState::Stuck) {
                stuck_run.insert(name.clone(), 0);
            }
            let at_home = view.state == Some(AgentState::AtHome);
            if view.visible == at_home {
                hidden_mismatch += 1;
            }
        }
    }

    if verbose {
        println!(
            "    simulated {} ticks, clock at {:.2}h",
            ticks,
            engine.hour_of_day()
        );
    }

    // Every scheduled visit happened
    let mut missed = Vec::new();
    for profile in &village.villagers {
        for (index, entry) in profile.schedule.entries().iter().enumerate() {
            let directive = profile
                .schedule
                .directive((entry.start_hour + entry.end_hour) / 2.0, engine.config());
            if let Directive::Visit { entry: e, kind } = directive {
                if e == index && !reached.contains(&(profile.name.clone(), kind)) {
                    missed.push(format!("{} → {}", profile.name, kind.name()));
                }
            }
        }
    }
    results.push(TestResult {
        name: "scheduled_visits_reached".into(),
        passed: missed.is_empty(),
        detail: format!("{} reached, missed: {:?}", reached.len(), missed),
    });

    let worst = worst_stuck.values().copied().max().unwrap_or(0);
    results.push(TestResult {
        name: "no_lasting_stuck".into(),
        passed: worst < 20,
        detail: format!("longest stuck run {} ticks", worst),
    });

    let not_home: Vec<&str> = villagers
        .iter()
        .filter(|(_, e)| {
            engine
                .agent_view(*e)
                .map(|v| v.state != Some(AgentState::AtHome) || v.visible || v.moving)
                .unwrap_or(true)
        })
        .map(|(name, _)| name.as_str())
        .collect();
    results.push(TestResult {
        name: "everyone_home_at_night".into(),
        passed: not_home.is_empty(),
        detail: format!("not home: {:?}", not_home),
    });

    results.push(TestResult {
        name: "home_visibility".into(),
        passed: hidden_mismatch == 0,
        detail: format!("{} mismatched ticks", hidden_mismatch),
    });

    let player_end = engine.agent_view(player).map(|v| v.position);
    results.push(TestResult {
        name: "player_arrived".into(),
        passed: player_end.is_some_and(|p| p.distance(&player_goal) < 0.05),
        detail: format!("ended at {:?}", player_end),
    });

    results.extend(validate_save_load(&mut engine, &villagers));

    results
}

fn validate_save_load(
    engine: &mut SimulationEngine,
    villagers: &[(String, Entity)],
) -> Vec<TestResult> {
    let mut results = Vec::new();

    // Send everyone out so positions actually change after the save
    engine.set_hour(10.0);
    engine.set_time_scale(1.0);
    for _ in 0..5 {
        engine.update(DT);
    }
    let before = positions(engine, villagers);

    let mut buffer = Vec::new();
    if let Err(e) = engine.save(&mut buffer) {
        results.push(TestResult {
            name: "save_load".into(),
            passed: false,
            detail: format!("save failed: {}", e),
        });
        return results;
    }
    for _ in 0..20 {
        engine.update(DT);
    }
    let moved = positions(engine, villagers) != before;

    let restored = engine.load(buffer.as_slice());
    let after = positions(engine, villagers);
    results.push(TestResult {
        name: "save_load".into(),
        passed: moved && after == before && restored.as_ref().is_ok_and(|n| *n == villagers.len() + 1),
        detail: format!("{} bytes, restored {:?}", buffer.len(), restored.map_err(|e| e.to_string())),
    });

    results
}

fn positions(engine: &SimulationEngine, villagers: &[(String, Entity)]) -> Vec<Option<WorldPos>> {
    villagers
        .iter()
        .map(|(_, e)| engine.agent_view(*e).map(|v| v.position))
        .collect()
}
