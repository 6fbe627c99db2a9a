//! A* pathfinding over the tile grid.
//!
//! Four-connected moves, unit step cost, Manhattan heuristic. The heuristic is
//! admissible and consistent for that move set, so any route returned is a
//! shortest one.
//!
//! Every call runs a fresh search against the live [`Tilemap`]; there is no
//! route cache to invalidate when the map is edited.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid::{Cell, Tilemap, WorldPos};

/// World positions of each cell to walk through, start cell excluded, goal
/// cell included. Empty when start and goal share a cell.
pub type Route = Vec<WorldPos>;

/// Manhattan distance between two cells.
pub fn manhattan(a: Cell, b: Cell) -> u32 {
    a.manhattan(b)
}

/// Open-set entry. `BinaryHeap` is a max-heap, so the ordering is reversed:
/// the "greatest" node has the lowest `f`, then lowest `h`, then lowest
/// `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f: u32,
    h: u32,
    cell: Cell,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h.cmp(&self.h))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a route between two world positions.
///
/// Returns `None` when the goal cell is unwalkable or not connected to the
/// start. The start cell itself is never checked, so an agent standing on an
/// obstacle can still walk off it.
pub fn find_path(tiles: &Tilemap, start: WorldPos, goal: WorldPos) -> Option<Route> {
    let start_cell = tiles.world_to_cell(start);
    let goal_cell = tiles.world_to_cell(goal);
    let cells = find_path_cells(tiles, start_cell, goal_cell)?;
    Some(
        cells
            .into_iter()
            .map(|c| tiles.cell_to_world_center(c))
            .collect(),
    )
}

/// Cell-space A*. Same contract as [`find_path`].
pub fn find_path_cells(tiles: &Tilemap, start: Cell, goal: Cell) -> Option<Vec<Cell>> {
    let mut open = BinaryHeap::new();
    let mut closed: HashSet<Cell> = HashSet::new();
    let mut came_from: HashMap<Cell, Cell> = HashMap::new();
    let mut g_score: HashMap<Cell, u32> = HashMap::new();

    let h = manhattan(start, goal);
    g_score.insert(start, 0);
    open.push(OpenNode {
        f: h,
        h,
        cell: start,
    });

    while let Some(node) = open.pop() {
        if node.cell == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        // Skip superseded heap entries
        if !closed.insert(node.cell) {
            continue;
        }

        let g = g_score.get(&node.cell).copied().unwrap_or_default();
        for next in node.cell.neighbors() {
            if closed.contains(&next) || !tiles.is_walkable(next) {
                continue;
            }
            let tentative = g + 1;
            if g_score.get(&next).is_some_and(|&best| best <= tentative) {
                continue;
            }
            g_score.insert(next, tentative);
            came_from.insert(next, node.cell);
            let h = manhattan(next, goal);
            open.push(OpenNode {
                f: tentative.saturating_add(h),
                h,
                cell: next,
            });
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut current = goal;
    while current != start {
        cells.push(current);
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
    }
    cells.reverse();
    cells
}
