//! Grid walkability oracle.
//!
//! A [`Tilemap`] holds two parallel tile layers: the ground layer (tiles an
//! agent can stand on) and the obstacle layer (buildings, fences, rubble).
//! Both are painted by whoever owns the map; this module only reads them.
//!
//! A cell is walkable when it has ground and no obstacle. A cell that was
//! never painted is treated exactly like an obstacle. Nothing here caches a
//! walkability answer, so an obstacle placed between two ticks is seen by the
//! very next query.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::CELL_SIZE;
use crate::error::NavError;

/// Integer grid coordinate addressing one tile.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shifted cell, clamped at the edges of the `i32` plane.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Shifted cell, or `None` past the edge of the `i32` plane.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// `|dx| + |dy|`, the exact step count on an open 4-connected grid.
    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }

    /// The orthogonal neighbours, in +x, -x, +y, -y order. A cell on the
    /// edge of the `i32` plane has fewer than four.
    pub fn neighbors(self) -> impl Iterator<Item = Cell> {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .filter_map(move |(dx, dy)| self.checked_offset(dx, dy))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 2D world-space position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Step toward `target` by at most `max_delta`, landing exactly on it
    /// instead of overshooting.
    pub fn move_towards(self, target: WorldPos, max_delta: f32) -> WorldPos {
        let dist = self.distance(&target);
        if dist <= max_delta || dist == 0.0 {
            return target;
        }
        let t = max_delta / dist;
        WorldPos {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }
}

impl std::ops::Add for WorldPos {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for WorldPos {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Mapping between world space and cell space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// World units per cell edge.
    pub cell_size: f32,
    /// World position of the corner of cell (0, 0).
    pub origin: WorldPos,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            cell_size: CELL_SIZE,
            origin: WorldPos::ZERO,
        }
    }
}

impl GridLayout {
    pub fn new(cell_size: f32, origin: WorldPos) -> Self {
        Self { cell_size, origin }
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        Cell {
            x: ((pos.x - self.origin.x) / self.cell_size).floor() as i32,
            y: ((pos.y - self.origin.y) / self.cell_size).floor() as i32,
        }
    }

    pub fn cell_to_world_center(&self, cell: Cell) -> WorldPos {
        WorldPos {
            x: self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            y: self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        }
    }
}

/// Inclusive rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub min: Cell,
    pub max: Cell,
}

impl CellBounds {
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    pub fn width(&self) -> u32 {
        self.min.x.abs_diff(self.max.x) + 1
    }

    pub fn height(&self) -> u32 {
        self.min.y.abs_diff(self.max.y) + 1
    }

    /// Row-major iteration over every cell in the rectangle.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.y..=self.max.y)
            .flat_map(move |y| (self.min.x..=self.max.x).map(move |x| Cell::new(x, y)))
    }
}

/// A set of painted cells.
#[derive(Debug, Clone, Default)]
pub struct TileLayer {
    tiles: HashSet<Cell>,
}

impl TileLayer {
    pub fn has(&self, cell: Cell) -> bool {
        self.tiles.contains(&cell)
    }

    pub fn set(&mut self, cell: Cell) {
        self.tiles.insert(cell);
    }

    pub fn remove(&mut self, cell: Cell) {
        self.tiles.remove(&cell);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Smallest rectangle covering every painted cell.
    pub fn bounds(&self) -> Option<CellBounds> {
        let mut iter = self.tiles.iter();
        let first = *iter.next()?;
        let mut bounds = CellBounds {
            min: first,
            max: first,
        };
        for cell in iter {
            bounds.min.x = bounds.min.x.min(cell.x);
            bounds.min.y = bounds.min.y.min(cell.y);
            bounds.max.x = bounds.max.x.max(cell.x);
            bounds.max.y = bounds.max.y.max(cell.y);
        }
        Some(bounds)
    }
}

/// Ground and obstacle layers plus the layout that places them in the world.
#[derive(Debug, Clone, Default)]
pub struct Tilemap {
    layout: GridLayout,
    ground: TileLayer,
    obstacles: TileLayer,
}

impl Tilemap {
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            ground: TileLayer::default(),
            obstacles: TileLayer::default(),
        }
    }

    /// Build a map from text rows. Row `i` is `y = i`, column `j` is `x = j`.
    ///
    /// `.` paints ground, `#` paints ground with an obstacle on top, anything
    /// else leaves the cell empty.
    pub fn from_ascii(layout: GridLayout, rows: &[&str]) -> Self {
        let mut map = Self::new(layout);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                match ch {
                    '.' => map.paint_ground(cell),
                    '#' => {
                        map.paint_ground(cell);
                        map.place_obstacle(cell);
                    }
                    _ => {}
                }
            }
        }
        map
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn ground(&self) -> &TileLayer {
        &self.ground
    }

    pub fn obstacles(&self) -> &TileLayer {
        &self.obstacles
    }

    pub fn paint_ground(&mut self, cell: Cell) {
        self.ground.set(cell);
    }

    pub fn erase_ground(&mut self, cell: Cell) {
        self.ground.remove(cell);
    }

    pub fn place_obstacle(&mut self, cell: Cell) {
        self.obstacles.set(cell);
    }

    pub fn remove_obstacle(&mut self, cell: Cell) {
        self.obstacles.remove(cell);
    }

    /// Paint ground over the inclusive rectangle `min..=max`.
    pub fn fill_ground(&mut self, min: Cell, max: Cell) {
        let bounds = CellBounds { min, max };
        for cell in bounds.cells() {
            self.ground.set(cell);
        }
    }

    pub fn world_to_cell(&self, pos: WorldPos) -> Cell {
        self.layout.world_to_cell(pos)
    }

    pub fn cell_to_world_center(&self, cell: Cell) -> WorldPos {
        self.layout.cell_to_world_center(cell)
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        self.ground.has(cell) && !self.obstacles.has(cell)
    }

    pub fn is_walkable_at(&self, pos: WorldPos) -> bool {
        self.is_walkable(self.world_to_cell(pos))
    }

    /// Bounds of the populated part of the ground layer.
    pub fn cell_bounds(&self) -> Option<CellBounds> {
        self.ground.bounds()
    }

    /// All walkable cells in row-major order.
    pub fn walkable_cells(&self) -> Vec<Cell> {
        match self.cell_bounds() {
            Some(bounds) => bounds.cells().filter(|c| self.is_walkable(*c)).collect(),
            None => Vec::new(),
        }
    }

    /// Centre of a uniformly chosen walkable cell anywhere on the map.
    pub fn random_walkable_position(&self, rng: &mut impl Rng) -> Option<WorldPos> {
        let cells = self.walkable_cells();
        if cells.is_empty() {
            return None;
        }
        let cell = cells[rng.gen_range(0..cells.len())];
        Some(self.cell_to_world_center(cell))
    }

    /// Centre of a uniformly chosen walkable cell within `radius` cells
    /// (Chebyshev) of the cell containing `center`.
    pub fn random_walkable_near(
        &self,
        center: WorldPos,
        radius: i32,
        rng: &mut impl Rng,
    ) -> Option<WorldPos> {
        let origin = self.world_to_cell(center);
        let area = CellBounds {
            min: origin.offset(-radius, -radius),
            max: origin.offset(radius, radius),
        };
        let candidates: Vec<Cell> = area.cells().filter(|c| self.is_walkable(*c)).collect();
        if candidates.is_empty() {
            return None;
        }
        let cell = candidates[rng.gen_range(0..candidates.len())];
        Some(self.cell_to_world_center(cell))
    }

    /// Nearest walkable cell centre to `from`, searching square rings of
    /// growing radius `0..max_radius`.
    ///
    /// Within the first ring that holds any walkable cell, the one closest to
    /// `from` wins; equal distances keep row-major scan order.
    pub fn closest_walkable(&self, from: WorldPos, max_radius: i32) -> Result<WorldPos, NavError> {
        let origin = self.world_to_cell(from);
        for radius in 0..max_radius {
            let ring = CellBounds {
                min: origin.offset(-radius, -radius),
                max: origin.offset(radius, radius),
            };
            let best = ring
                .cells()
                .filter(|c| {
                    c.x.abs_diff(origin.x).max(c.y.abs_diff(origin.y)) == radius.unsigned_abs()
                })
                .filter(|c| self.is_walkable(*c))
                .map(|c| self.cell_to_world_center(c))
                .min_by(|a, b| {
                    a.distance_squared(&from)
                        .partial_cmp(&b.distance_squared(&from))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(pos) = best {
                return Ok(pos);
            }
        }
        Err(NavError::NoWalkableCell {
            origin,
            radius: max_radius,
        })
    }
}
