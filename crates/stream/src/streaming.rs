use std::cmp::Ordering;
use std::time::{Duration, Instant};

use glam::Vec3;
use roadworld_common::{CellCoord, WorldError};
use roadworld_kernel::{Cell, World};
use serde::{Deserialize, Serialize};

use crate::grid::GridMapper;

/// Largest accepted window radius.
pub const MAX_STREAM_RADIUS: i32 = 64;

/// Streaming configuration: window radius plus the optional residency cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Radius (in cells) of the square window kept resident around the observer.
    pub radius: i32,
    /// Resident cell cap. `None` keeps every generated cell for the whole session.
    pub max_resident_cells: Option<usize>,
    /// Maximum number of cells to evict per tick.
    pub unload_budget: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            radius: 2,
            max_resident_cells: None,
            unload_budget: 8,
        }
    }
}

impl StreamConfig {
    /// Number of cells in the window.
    pub fn window_len(&self) -> usize {
        let side = 2 * u64::from(self.radius.max(0).unsigned_abs()) + 1;
        usize::try_from(side * side).unwrap_or(usize::MAX)
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        if !(0..=MAX_STREAM_RADIUS).contains(&self.radius) {
            return Err(WorldError::Config(format!(
                "radius must be in 0..={MAX_STREAM_RADIUS}, got {}",
                self.radius
            )));
        }
        if let Some(cap) = self.max_resident_cells {
            if cap < self.window_len() {
                return Err(WorldError::Config(format!(
                    "max_resident_cells {cap} is smaller than the {}-cell window",
                    self.window_len()
                )));
            }
        }
        Ok(())
    }
}

/// What one tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Whether the observer entered a new cell.
    pub moved: bool,
    pub generated: Vec<CellCoord>,
    pub evicted: Vec<CellCoord>,
}

/// Per-tick streaming statistics for instrumentation.
#[derive(Debug, Clone, Default)]
pub struct StreamStats {
    pub cells_generated_this_tick: usize,
    pub cells_evicted_this_tick: usize,
    pub total_resident_cells: usize,
    pub total_colliders: usize,
    pub tick_time: Duration,
}

/// Tracks the observer's cell and keeps the window around it generated.
///
/// Edge generation only covers the column/row that enters the window, so a
/// tick that skips cells can leave holes; [`StreamState::ensure_window`] and
/// [`StreamState::resident_window`] fill them on read.
pub struct StreamState {
    pub config: StreamConfig,
    mapper: GridMapper,
    center: CellCoord,
    stats: StreamStats,
}

impl StreamState {
    pub fn new(config: StreamConfig, mapper: GridMapper) -> Self {
        Self {
            config,
            mapper,
            center: CellCoord::ORIGIN,
            stats: StreamStats::default(),
        }
    }

    /// Streaming state matching a world's cell size, centred on the origin.
    pub fn for_world(config: StreamConfig, world: &World) -> Self {
        Self::new(config, GridMapper::new(world.cell_size()))
    }

    /// Last known observer cell.
    pub fn center(&self) -> CellCoord {
        self.center
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Get statistics from the last tick.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Coordinates of the current window, row by row.
    pub fn window(&self) -> Vec<CellCoord> {
        self.mapper.cells_in_radius(self.center, self.config.radius)
    }

    /// Generate the initial window. The center goes first so the spawn cell
    /// is committed before any neighbor.
    pub fn prime(&mut self, world: &mut World) -> Vec<CellCoord> {
        let mut generated = Vec::new();
        if !world.cells().contains(self.center) {
            world.get_or_create(self.center);
            generated.push(self.center);
        }
        generated.extend(self.ensure_window(world));
        tracing::info!(
            center = %self.center,
            cells = world.cell_count(),
            "primed streaming window"
        );
        generated
    }

    /// Update streaming state from the observer's position.
    ///
    /// When the observer crossed into another cell, generates the column
    /// and/or row entering the window on the side it moved toward, then
    /// applies eviction if a residency cap is configured.
    pub fn tick(&mut self, position: Vec3, world: &mut World) -> TickReport {
        let _span = tracing::info_span!("stream_tick").entered();
        let tick_start = Instant::now();

        let new_center = self.mapper.position_to_cell(position);
        let mut report = TickReport::default();

        if new_center != self.center {
            let r = self.config.radius;
            match new_center.x.cmp(&self.center.x) {
                Ordering::Greater => self.generate_edge(world, new_center, (r, 0), &mut report),
                Ordering::Less => self.generate_edge(world, new_center, (-r, 0), &mut report),
                Ordering::Equal => {}
            }
            match new_center.y.cmp(&self.center.y) {
                Ordering::Greater => self.generate_edge(world, new_center, (0, r), &mut report),
                Ordering::Less => self.generate_edge(world, new_center, (0, -r), &mut report),
                Ordering::Equal => {}
            }
            tracing::debug!(
                from = %self.center,
                to = %new_center,
                generated = report.generated.len(),
                "observer entered new cell"
            );
            self.center = new_center;
            report.moved = true;
        }

        report.evicted = self.evict_excess(world);

        self.stats = StreamStats {
            cells_generated_this_tick: report.generated.len(),
            cells_evicted_this_tick: report.evicted.len(),
            total_resident_cells: world.cell_count(),
            total_colliders: world.collider_count(),
            tick_time: tick_start.elapsed(),
        };

        tracing::trace!(
            generated = report.generated.len(),
            evicted = report.evicted.len(),
            total = world.cell_count(),
            "stream tick complete"
        );

        report
    }

    /// Generate every missing window cell. Returns the cells that were created.
    pub fn ensure_window(&self, world: &mut World) -> Vec<CellCoord> {
        let mut generated = Vec::new();
        for coord in self.window() {
            if !world.cells().contains(coord) {
                world.get_or_create(coord);
                generated.push(coord);
            }
        }
        if !generated.is_empty() {
            tracing::debug!(
                center = %self.center,
                filled = generated.len(),
                "filled holes in streaming window"
            );
        }
        generated
    }

    /// The window's cells, generating any that are missing first.
    pub fn resident_window<'w>(&self, world: &'w mut World) -> Vec<&'w Cell> {
        self.ensure_window(world);
        let world: &'w World = world;
        self.window()
            .into_iter()
            .filter_map(|c| world.cell(c))
            .collect()
    }

    /// Whether every window cell is already in the store.
    pub fn is_window_resident(&self, world: &World) -> bool {
        self.window().into_iter().all(|c| world.cells().contains(c))
    }

    /// Generate the line of cells at `edge` from `center`, spanning the full
    /// window along the other axis.
    fn generate_edge(
        &self,
        world: &mut World,
        center: CellCoord,
        edge: (i32, i32),
        report: &mut TickReport,
    ) {
        let r = self.config.radius;
        for along in -r..=r {
            let (dx, dy) = if edge.0 != 0 { (edge.0, along) } else { (along, edge.1) };
            let coord = match center.checked_offset(dx, dy) {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "edge cell outside the grid");
                    continue;
                }
            };
            if !world.cells().contains(coord) {
                world.get_or_create(coord);
                report.generated.push(coord);
            }
        }
    }

    /// Evict cells outside the window, farthest first, until the store is
    /// back under the cap or the per-tick budget is spent.
    fn evict_excess(&self, world: &mut World) -> Vec<CellCoord> {
        let Some(cap) = self.config.max_resident_cells else {
            return Vec::new();
        };
        let excess = world.cell_count().saturating_sub(cap);
        if excess == 0 {
            return Vec::new();
        }

        let radius = self.config.radius.max(0) as u32;
        let mut candidates: Vec<(u32, CellCoord)> = world
            .cells()
            .coords()
            .map(|c| (c.chebyshev_distance(self.center), c))
            .filter(|(d, _)| *d > radius)
            .collect();
        candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let evicted: Vec<CellCoord> = candidates
            .into_iter()
            .take(excess.min(self.config.unload_budget))
            .map(|(_, c)| c)
            .collect();
        for c in &evicted {
            world.evict(*c);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadworld_common::CellType;

    fn setup(seed: u64, config: StreamConfig) -> (World, StreamState) {
        let mut world = World::with_seed(seed);
        let mut state = StreamState::for_world(config, &world);
        state.prime(&mut world);
        (world, state)
    }

    /// World position at the center of a cell.
    fn at(state: &StreamState, x: i32, y: i32) -> Vec3 {
        state.mapper().cell_center(CellCoord::new(x, y))
    }

    #[test]
    fn stream_config_defaults() {
        let config = StreamConfig::default();
        assert_eq!(config.radius, 2);
        assert_eq!(config.max_resident_cells, None);
        assert_eq!(config.unload_budget, 8);
        assert_eq!(config.window_len(), 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_cap_smaller_than_window() {
        let config = StreamConfig {
            max_resident_cells: Some(10),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(WorldError::Config(_))));
        let config = StreamConfig {
            radius: -1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_huge_radius() {
        let config = StreamConfig {
            radius: i32::MAX,
            max_resident_cells: Some(100),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(WorldError::Config(_))));
        assert!(config.window_len() > 100);

        let config = StreamConfig {
            radius: MAX_STREAM_RADIUS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = StreamConfig {
            radius: MAX_STREAM_RADIUS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_partial_json() {
        let config: StreamConfig =
            serde_json::from_str(r#"{ "max_resident_cells": 100 }"#).unwrap();
        assert_eq!(config.radius, 2);
        assert_eq!(config.max_resident_cells, Some(100));
    }

    #[test]
    fn prime_generates_the_initial_window() {
        let (world, state) = setup(1, StreamConfig::default());
        assert_eq!(world.cell_count(), 25);
        assert!(state.is_window_resident(&world));
        assert_eq!(
            world.cell(CellCoord::ORIGIN).unwrap().cell_type,
            CellType::Highway
        );
    }

    #[test]
    fn tick_within_same_cell_is_a_noop() {
        let (mut world, mut state) = setup(2, StreamConfig::default());
        let before = world.state_hash();
        let report = state.tick(Vec3::new(10.0, 0.0, 40.0), &mut world);
        assert!(!report.moved);
        assert!(report.generated.is_empty());
        assert_eq!(world.state_hash(), before);
        assert_eq!(state.center(), CellCoord::ORIGIN);
    }

    #[test]
    fn moving_east_generates_one_column() {
        let (mut world, mut state) = setup(3, StreamConfig::default());
        let report = state.tick(at(&state, 1, 0), &mut world);
        assert!(report.moved);
        assert_eq!(report.generated.len(), 5);
        assert!(report.generated.iter().all(|c| c.x == 3));
        assert_eq!(state.center(), CellCoord::new(1, 0));
        assert_eq!(state.stats().cells_generated_this_tick, 5);
        assert_eq!(state.stats().total_resident_cells, 30);
    }

    #[test]
    fn moving_south_generates_one_row() {
        let (mut world, mut state) = setup(3, StreamConfig::default());
        let report = state.tick(at(&state, 0, -1), &mut world);
        assert_eq!(report.generated.len(), 5);
        assert!(report.generated.iter().all(|c| c.y == -3));
    }

    #[test]
    fn diagonal_move_generates_column_and_row() {
        let (mut world, mut state) = setup(4, StreamConfig::default());
        let report = state.tick(at(&state, -1, 1), &mut world);
        // 5 in the column, 5 in the row, one shared corner.
        assert_eq!(report.generated.len(), 9);
        assert!(state.is_window_resident(&world));
    }

    #[test]
    fn unit_steps_keep_the_window_resident_without_fallback() {
        let (mut world, mut state) = setup(5, StreamConfig::default());
        let path = [(1, 0), (2, 0), (3, 1), (3, 2), (2, 3), (1, 3), (0, 2), (-1, 1), (-1, 0), (-2, -1)];
        for (x, y) in path {
            state.tick(at(&state, x, y), &mut world);
            assert!(state.is_window_resident(&world), "hole after moving to ({x}, {y})");
        }
    }

    #[test]
    fn teleport_leaves_holes_until_window_is_read() {
        let (mut world, mut state) = setup(6, StreamConfig::default());
        state.tick(at(&state, 40, -17), &mut world);
        assert!(!state.is_window_resident(&world));
        let filled = state.ensure_window(&mut world);
        assert!(!filled.is_empty());
        assert!(state.is_window_resident(&world));
    }

    #[test]
    fn window_is_complete_after_any_tick_sequence_once_read() {
        let (mut world, mut state) = setup(7, StreamConfig::default());
        let mut pos = state.mapper().spawn_point();
        for i in 0..60 {
            // Irregular steps: sometimes within a cell, sometimes several cells.
            let step = Vec3::new(((i * 37) % 11) as f32 * 13.0 - 60.0, 0.0, ((i * 53) % 7) as f32 * 21.0 - 55.0);
            pos += step;
            state.tick(pos, &mut world);
            let cells = state.resident_window(&mut world);
            assert_eq!(cells.len(), 25);
        }
        let (cx, cy) = (state.center().x, state.center().y);
        for x in cx - 2..=cx + 2 {
            for y in cy - 2..=cy + 2 {
                assert!(world.cell(CellCoord::new(x, y)).is_some());
            }
        }
    }

    #[test]
    fn resident_window_is_in_window_order() {
        let (mut world, state) = setup(8, StreamConfig::default());
        let coords: Vec<CellCoord> = state
            .resident_window(&mut world)
            .into_iter()
            .map(|c| c.coord)
            .collect();
        assert_eq!(coords, state.window());
    }

    #[test]
    fn same_seed_and_path_give_same_world() {
        let path: Vec<(i32, i32)> = (0..20).map(|i| (i / 2, -(i / 3))).collect();
        let run = || {
            let (mut world, mut state) = setup(42, StreamConfig::default());
            for &(x, y) in &path {
                state.tick(at(&state, x, y), &mut world);
            }
            world.state_hash()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn unbounded_by_default() {
        let (mut world, mut state) = setup(9, StreamConfig::default());
        for x in 1..=20 {
            let report = state.tick(at(&state, x, 0), &mut world);
            assert!(report.evicted.is_empty());
        }
        assert_eq!(world.cell_count(), 25 + 20 * 5);
    }

    #[test]
    fn eviction_caps_residency_and_drops_colliders() {
        let config = StreamConfig {
            radius: 2,
            max_resident_cells: Some(40),
            unload_budget: 100,
        };
        let (mut world, mut state) = setup(10, config);
        for x in 1..=30 {
            state.tick(at(&state, x, 0), &mut world);
            assert!(world.cell_count() <= 40);
            assert!(state.is_window_resident(&world));
        }
        // Colliders only belong to resident cells.
        let expected: usize = world.cells().iter().map(|c| c.content.len()).sum();
        assert_eq!(world.collider_count(), expected);
        assert!(world.cell(CellCoord::ORIGIN).is_none());
    }

    #[test]
    fn event_log_stays_bounded_under_a_cap() {
        let config = StreamConfig {
            radius: 2,
            max_resident_cells: Some(40),
            unload_budget: 8,
        };
        let (mut world, mut state) = setup(14, config);
        for x in 1..=2000 {
            state.tick(at(&state, x, 0), &mut world);
        }
        assert!(world.cell_count() <= 40);
        assert!(world.events().len() <= 40, "{} events", world.events().len());
        assert_eq!(world.events().len(), world.cell_count());
    }

    #[test]
    fn eviction_is_farthest_first() {
        let config = StreamConfig {
            radius: 2,
            max_resident_cells: Some(30),
            unload_budget: 100,
        };
        let (mut world, mut state) = setup(11, config);
        state.tick(at(&state, 1, 0), &mut world);
        state.tick(at(&state, 2, 0), &mut world);
        assert!(world.cell(CellCoord::new(-2, 0)).is_none());
        let report = state.tick(at(&state, 3, 0), &mut world);
        // The westernmost remaining column is the farthest from (3, 0).
        assert_eq!(report.evicted.len(), 5);
        assert!(report.evicted.iter().all(|c| c.x == -1));
        assert!(world.cell(CellCoord::new(0, 0)).is_some());
        assert_eq!(world.cell_count(), 30);
    }

    #[test]
    fn eviction_respects_unload_budget() {
        let config = StreamConfig {
            radius: 2,
            max_resident_cells: Some(25),
            unload_budget: 2,
        };
        let (mut world, mut state) = setup(12, config);
        let report = state.tick(at(&state, 1, 0), &mut world);
        assert_eq!(report.evicted.len(), 2);
        assert_eq!(world.cell_count(), 28);
        assert_eq!(state.stats().cells_evicted_this_tick, 2);
    }
}
