//! Error taxonomy for navigation and configuration.
//!
//! None of these are fatal to the simulation: the schedule system handles
//! every [`NavError`] locally and degrades to "agent idles in place".

use thiserror::Error;

use crate::config::ConfigIssue;
use crate::grid::Cell;
use crate::poi::PoiKind;

/// Recoverable navigation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    /// The goal is unwalkable or lies in a region not connected to the start.
    #[error("no path from {from} to {to}")]
    NoPathFound { from: Cell, to: Cell },

    /// The bounded ring search around `origin` found nothing walkable.
    #[error("no walkable cell within {radius} rings of {origin}")]
    NoWalkableCell { origin: Cell, radius: i32 },

    /// A schedule names a category with zero registered POIs.
    #[error("no {0:?} point of interest is registered")]
    MissingPoi(PoiKind),

    /// A move command targeted a cell that cannot be entered.
    #[error("destination {0} is not walkable")]
    DestinationBlocked(Cell),
}

/// Errors produced while loading a [`crate::config::SimConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
