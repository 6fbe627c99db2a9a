//! Tuning constants shared by the navigation and scheduling code.
//!
//! These are the defaults for [`crate::config::SimConfig`]; systems read the
//! config, not these values directly, so a designer can override them per
//! village.

/// Hour at which villagers start heading home for the night.
pub const NIGHT_START_HOUR: f32 = 21.0;

/// Hour at which the night window ends and schedules apply again.
pub const DAY_START_HOUR: f32 = 6.0;

/// Hours in a day. The clock wraps at this value.
pub const HOURS_PER_DAY: f32 = 24.0;

/// Distance below which an agent counts as standing on its target.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// Distance below which the follower advances to the next waypoint.
pub const WAYPOINT_EPSILON: f32 = 0.05;

/// A route whose last waypoint is further than this from the target is stale.
pub const ROUTE_STALE_EPSILON: f32 = 0.1;

/// Rings searched when looking for a walkable cell to escape to.
pub const UNSTUCK_MAX_RADIUS: i32 = 20;

/// Radius (in cells) around a POI entry that scheduled visitors spread over.
pub const POI_SEARCH_RADIUS: i32 = 2;

/// Radius (in cells) around a POI or home used for spawn placement.
pub const SPAWN_SEARCH_RADIUS: i32 = 1;

/// Radius (in cells) around the home reference used as the going-home target.
pub const HOME_SEARCH_RADIUS: i32 = 1;

/// Seconds between free-roam retargets when no arrival happens first.
pub const FREE_ROAM_COOLDOWN: f32 = 3.0;

/// NPC walking speed in world units per second.
pub const NPC_MOVE_SPEED: f32 = 2.0;

/// Player walking speed in world units per second.
pub const PLAYER_MOVE_SPEED: f32 = 3.0;

/// World units per grid cell.
pub const CELL_SIZE: f32 = 1.0;
