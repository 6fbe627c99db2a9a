//! Simulation tuning loaded from JSON.
//!
//! Every field falls back to its value in [`crate::constants`], so a village
//! file only needs to mention what it overrides:
//!
//! ```
//! use hamlet_logic::config::SimConfig;
//!
//! let config = SimConfig::from_json(r#"{ "night_start_hour": 20.0 }"#).unwrap();
//! assert_eq!(config.night_start_hour, 20.0);
//! assert_eq!(config.day_start_hour, 6.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Start of the night window (inclusive).
    pub night_start_hour: f32,
    /// End of the night window (exclusive).
    pub day_start_hour: f32,
    pub arrival_epsilon: f32,
    pub waypoint_epsilon: f32,
    pub route_stale_epsilon: f32,
    /// Rings searched by stuck recovery before giving up for the tick.
    pub unstuck_max_radius: i32,
    pub poi_search_radius: i32,
    pub spawn_search_radius: i32,
    pub home_search_radius: i32,
    /// Seconds between free-roam retargets.
    pub free_roam_cooldown: f32,
    pub npc_move_speed: f32,
    pub player_move_speed: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            night_start_hour: NIGHT_START_HOUR,
            day_start_hour: DAY_START_HOUR,
            arrival_epsilon: ARRIVAL_EPSILON,
            waypoint_epsilon: WAYPOINT_EPSILON,
            route_stale_epsilon: ROUTE_STALE_EPSILON,
            unstuck_max_radius: UNSTUCK_MAX_RADIUS,
            poi_search_radius: POI_SEARCH_RADIUS,
            spawn_search_radius: SPAWN_SEARCH_RADIUS,
            home_search_radius: HOME_SEARCH_RADIUS,
            free_roam_cooldown: FREE_ROAM_COOLDOWN,
            npc_move_speed: NPC_MOVE_SPEED,
            player_move_speed: PLAYER_MOVE_SPEED,
        }
    }
}

/// A single problem found by [`SimConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigIssue {
    #[error("{field} must be within 0..=24 hours, got {value}")]
    HourOutOfRange { field: &'static str, value: f32 },
    #[error("day_start_hour ({day}) must be before night_start_hour ({night})")]
    NightWindowInverted { day: f32, night: f32 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    NegativeRadius { field: &'static str, value: i32 },
}

impl SimConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        let issues = config.validate();
        if issues.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(issues))
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("night_start_hour", self.night_start_hour),
            ("day_start_hour", self.day_start_hour),
        ] {
            if !(0.0..=HOURS_PER_DAY).contains(&value) {
                issues.push(ConfigIssue::HourOutOfRange { field, value });
            }
        }
        if self.day_start_hour >= self.night_start_hour {
            issues.push(ConfigIssue::NightWindowInverted {
                day: self.day_start_hour,
                night: self.night_start_hour,
            });
        }

        for (field, value) in [
            ("arrival_epsilon", self.arrival_epsilon),
            ("waypoint_epsilon", self.waypoint_epsilon),
            ("route_stale_epsilon", self.route_stale_epsilon),
            ("free_roam_cooldown", self.free_roam_cooldown),
            ("npc_move_speed", self.npc_move_speed),
            ("player_move_speed", self.player_move_speed),
        ] {
            if value <= 0.0 {
                issues.push(ConfigIssue::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("unstuck_max_radius", self.unstuck_max_radius),
            ("poi_search_radius", self.poi_search_radius),
            ("spawn_search_radius", self.spawn_search_radius),
            ("home_search_radius", self.home_search_radius),
        ] {
            if value < 0 {
                issues.push(ConfigIssue::NegativeRadius { field, value });
            }
        }

        issues
    }

    /// `hour >= night_start || hour < day_start`.
    pub fn is_night(&self, hour: f32) -> bool {
        hour >= self.night_start_hour || hour < self.day_start_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_empty());
    }

    #[test]
    fn test_night_window() {
        let config = SimConfig::default();
        assert!(config.is_night(22.0));
        assert!(config.is_night(21.0));
        assert!(config.is_night(3.5));
        assert!(!config.is_night(6.0));
        assert!(!config.is_night(20.99));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "free_roam_cooldown": 5.0 }"#).unwrap();
        assert_eq!(config.free_roam_cooldown, 5.0);
        assert_eq!(config.unstuck_max_radius, UNSTUCK_MAX_RADIUS);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let json = r#"{ "day_start_hour": 22.0, "npc_move_speed": 0.0, "poi_search_radius": -1 }"#;
        let Err(ConfigError::Invalid(issues)) = SimConfig::from_json(json) else {
            panic!("expected validation failure");
        };
        assert_eq!(issues.len(), 3);
        assert!(issues.contains(&ConfigIssue::NightWindowInverted {
            day: 22.0,
            night: 21.0
        }));
    }
}
