//! Route following.
//!
//! A [`PathFollower`] owns at most one route and a cursor into it. Each tick
//! the owner calls [`PathFollower::step`] with the agent's position and gets
//! back the new position plus what rendering needs to animate it.

use serde::{Deserialize, Serialize};

use crate::grid::WorldPos;
use crate::pathfinding::Route;

/// Horizontal facing for sprite flipping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Outcome of one follower tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowStep {
    pub position: WorldPos,
    /// `None` when the waypoint is straight above or below.
    pub facing: Option<Facing>,
    pub moving: bool,
    /// Set on the tick the final waypoint is reached.
    pub finished: bool,
}

impl FollowStep {
    fn idle(position: WorldPos) -> Self {
        Self {
            position,
            facing: None,
            moving: false,
            finished: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathFollower {
    route: Option<Route>,
    cursor: usize,
}

impl PathFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current route and rewind the cursor.
    pub fn set_route(&mut self, route: Route) {
        self.route = Some(route);
        self.cursor = 0;
    }

    /// Drop the current route.
    pub fn clear(&mut self) {
        self.route = None;
        self.cursor = 0;
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True while there are waypoints left to walk.
    pub fn is_active(&self) -> bool {
        self.route
            .as_ref()
            .is_some_and(|route| self.cursor < route.len())
    }

    pub fn remaining(&self) -> usize {
        self.route
            .as_ref()
            .map(|route| route.len().saturating_sub(self.cursor))
            .unwrap_or(0)
    }

    pub fn current_waypoint(&self) -> Option<WorldPos> {
        self.route.as_ref()?.get(self.cursor).copied()
    }

    pub fn final_waypoint(&self) -> Option<WorldPos> {
        self.route.as_ref()?.last().copied()
    }

    /// A route is stale once its last waypoint no longer lands on `target`.
    /// An empty route (start already in the target cell) is never stale.
    pub fn is_stale_for(&self, target: WorldPos, epsilon: f32) -> bool {
        match self.final_waypoint() {
            Some(last) => last.distance(&target) > epsilon,
            None => false,
        }
    }

    /// Walk toward the current waypoint by at most `speed * dt`.
    pub fn step(&mut self, position: WorldPos, speed: f32, dt: f32, epsilon: f32) -> FollowStep {
        let Some(waypoint) = self.current_waypoint() else {
            return FollowStep::idle(position);
        };

        let new_position = position.move_towards(waypoint, speed * dt);
        let facing = if waypoint.x > position.x {
            Some(Facing::Right)
        } else if waypoint.x < position.x {
            Some(Facing::Left)
        } else {
            None
        };

        let mut finished = false;
        if new_position.distance(&waypoint) < epsilon {
            self.cursor += 1;
            finished = !self.is_active();
        }

        FollowStep {
            position: new_position,
            facing,
            moving: true,
            finished,
        }
    }
}
