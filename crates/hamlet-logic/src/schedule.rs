//! Daily schedule tables.
//!
//! A schedule is an ordered list of `[start_hour, end_hour)` windows, each
//! sending the villager to a POI category or letting them free-roam. List
//! order is priority: the first window containing the hour wins, and windows
//! may leave gaps or overlap. A window never wraps past midnight; the night
//! window is handled by [`Schedule::directive`] instead.
//!
//! ```
//! use hamlet_logic::config::SimConfig;
//! use hamlet_logic::poi::PoiKind;
//! use hamlet_logic::schedule::{Directive, Schedule, ScheduleEntry};
//!
//! let schedule = Schedule::new(vec![
//!     ScheduleEntry::visit(8.0, 12.0, PoiKind::Market),
//!     ScheduleEntry::free_roam(12.0, 18.0),
//! ]);
//! let config = SimConfig::default();
//! assert_eq!(
//!     schedule.directive(9.0, &config),
//!     Directive::Visit { entry: 0, kind: PoiKind::Market }
//! );
//! assert_eq!(schedule.directive(22.0, &config), Directive::GoHome);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::constants::HOURS_PER_DAY;
use crate::poi::PoiKind;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub start_hour: f32,
    pub end_hour: f32,
    #[serde(default)]
    pub poi: PoiKind,
    #[serde(default)]
    pub free_roam: bool,
}

impl ScheduleEntry {
    pub fn visit(start_hour: f32, end_hour: f32, poi: PoiKind) -> Self {
        Self {
            start_hour,
            end_hour,
            poi,
            free_roam: false,
        }
    }

    pub fn free_roam(start_hour: f32, end_hour: f32) -> Self {
        Self {
            start_hour,
            end_hour,
            poi: PoiKind::None,
            free_roam: true,
        }
    }

    /// A window that sends the villager home even in daytime.
    pub fn rest(start_hour: f32, end_hour: f32) -> Self {
        Self {
            start_hour,
            end_hour,
            poi: PoiKind::None,
            free_roam: false,
        }
    }

    pub fn contains(&self, hour: f32) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }

    fn overlaps(&self, other: &ScheduleEntry) -> bool {
        self.start_hour < other.end_hour && other.start_hour < self.end_hour
    }
}

/// What a villager should be doing at a given hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    GoHome,
    Visit { entry: usize, kind: PoiKind },
    FreeRoam { entry: usize },
}

/// A problem found by [`Schedule::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleIssue {
    /// `end_hour <= start_hour`, which would be a midnight wraparound.
    Inverted { entry: usize },
    OutOfRange { entry: usize },
    /// Both windows cover some hour; `first` always wins there.
    Overlap { first: usize, second: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    /// First entry whose window contains `hour`, with its index.
    pub fn active(&self, hour: f32) -> Option<(usize, &ScheduleEntry)> {
        self.entries.iter().enumerate().find(|(_, e)| e.contains(hour))
    }

    /// Resolve the hour into a directive.
    ///
    /// Night, an uncovered hour, or a window with neither a POI nor free-roam
    /// all mean "go home". A free-roam window ignores any POI it also names.
    pub fn directive(&self, hour: f32, config: &SimConfig) -> Directive {
        if config.is_night(hour) {
            return Directive::GoHome;
        }
        match self.active(hour) {
            Some((entry, e)) if e.free_roam => Directive::FreeRoam { entry },
            Some((entry, e)) if e.poi != PoiKind::None => Directive::Visit {
                entry,
                kind: e.poi,
            },
            _ => Directive::GoHome,
        }
    }

    /// Index pairs of entries whose windows overlap.
    pub fn overlaps(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.entries.iter().enumerate() {
            for (j, b) in self.entries.iter().enumerate().skip(i + 1) {
                if a.overlaps(b) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    pub fn validate(&self) -> Vec<ScheduleIssue> {
        let mut issues = Vec::new();
        for (entry, e) in self.entries.iter().enumerate() {
            let in_range = |h: f32| (0.0..=HOURS_PER_DAY).contains(&h);
            if !in_range(e.start_hour) || !in_range(e.end_hour) {
                issues.push(ScheduleIssue::OutOfRange { entry });
            }
            if e.end_hour <= e.start_hour {
                issues.push(ScheduleIssue::Inverted { entry });
            }
        }
        issues.extend(
            self.overlaps()
                .into_iter()
                .map(|(first, second)| ScheduleIssue::Overlap { first, second }),
        );
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shopkeeper() -> Schedule {
        Schedule::new(vec![
            ScheduleEntry::visit(7.0, 12.0, PoiKind::Market),
            ScheduleEntry::visit(12.0, 13.0, PoiKind::Inn),
            ScheduleEntry::visit(13.0, 18.0, PoiKind::Market),
            ScheduleEntry::free_roam(18.0, 20.0),
            ScheduleEntry::rest(20.0, 21.0),
        ])
    }

    #[test]
    fn test_active_window_bounds() {
        let s = shopkeeper();
        assert_eq!(s.active(7.0).map(|(i, _)| i), Some(0));
        assert_eq!(s.active(11.99).map(|(i, _)| i), Some(0));
        assert_eq!(s.active(12.0).map(|(i, _)| i), Some(1));
        assert_eq!(s.active(6.5), None);
    }

    #[test]
    fn test_directives() {
        let s = shopkeeper();
        let config = SimConfig::default();
        assert_eq!(
            s.directive(12.5, &config),
            Directive::Visit {
                entry: 1,
                kind: PoiKind::Inn
            }
        );
        assert_eq!(s.directive(19.0, &config), Directive::FreeRoam { entry: 3 });
        // Rest window
        assert_eq!(s.directive(20.5, &config), Directive::GoHome);
        // Gap before the first window
        assert_eq!(s.directive(6.5, &config), Directive::GoHome);
        // Night beats everything
        assert_eq!(s.directive(22.0, &config), Directive::GoHome);
        assert_eq!(s.directive(2.0, &config), Directive::GoHome);
    }

    #[test]
    fn test_night_overrides_daytime_entry() {
        let s = Schedule::new(vec![ScheduleEntry::free_roam(0.0, 24.0)]);
        let config = SimConfig::default();
        assert_eq!(s.directive(23.0, &config), Directive::GoHome);
        assert_eq!(s.directive(10.0, &config), Directive::FreeRoam { entry: 0 });
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let s = Schedule::new(vec![
            ScheduleEntry::visit(8.0, 14.0, PoiKind::Blacksmith),
            ScheduleEntry::visit(10.0, 16.0, PoiKind::Shrine),
        ]);
        let config = SimConfig::default();
        assert_eq!(
            s.directive(11.0, &config),
            Directive::Visit {
                entry: 0,
                kind: PoiKind::Blacksmith
            }
        );
        assert_eq!(s.overlaps(), vec![(0, 1)]);
        assert!(s
            .validate()
            .contains(&ScheduleIssue::Overlap { first: 0, second: 1 }));
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        assert!(shopkeeper().overlaps().is_empty());
        assert!(shopkeeper().validate().is_empty());
    }

    #[test]
    fn test_inverted_entry_flagged() {
        let s = Schedule::new(vec![ScheduleEntry::visit(22.0, 2.0, PoiKind::Inn)]);
        assert_eq!(s.validate(), vec![ScheduleIssue::Inverted { entry: 0 }]);
        assert_eq!(s.active(23.0), None);
    }

    #[test]
    fn test_schedule_json() {
        let json = r#"[
            { "start_hour": 8.0, "end_hour": 12.0, "poi": "Market" },
            { "start_hour": 12.0, "end_hour": 18.0, "free_roam": true }
        ]"#;
        let s: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.entries().len(), 2);
        assert_eq!(s.entries()[0].poi, PoiKind::Market);
        assert!(s.entries()[1].free_roam);
    }
}
