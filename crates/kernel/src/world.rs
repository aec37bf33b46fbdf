use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use roadworld_common::{
    CellCoord, CellType, Fnv1a, RoadType, SurfaceModifiers, WorldError, cell_seed, splitmix64,
};
use serde::{Deserialize, Serialize};

use crate::adjacency::{Resolution, resolve_type};
use crate::cell::Cell;
use crate::collision::{BoundingVolume, CollisionRegistry};
use crate::config::WorldConfig;
use crate::generator::generate;
use crate::store::CellStore;

/// An event record produced by every change to the cell store.
///
/// Because content is a pure function of `(coord, type)`, the log is enough to
/// rebuild an identical world without re-running the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A cell was committed with the given type.
    Generated {
        coord: CellCoord,
        cell_type: CellType,
        resolution: Resolution,
    },
    /// A cell and its colliders were dropped.
    Evicted { coord: CellCoord },
}

/// The authoritative world state.
///
/// Owns the cell store and the collider registry; nothing else writes to
/// them. Readers go through [`World::cell`] or [`World::get_or_create`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    config: WorldConfig,
    cells: CellStore,
    colliders: CollisionRegistry,
    /// Append-only event log of all mutations.
    #[serde(skip)]
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Empty world with the default configuration and seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: WorldConfig::with_seed(seed),
            ..Default::default()
        }
    }

    pub fn with_config(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn cells(&self) -> &CellStore {
        &self.cells
    }

    pub fn colliders(&self) -> &CollisionRegistry {
        &self.colliders
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Resident cell at `coord`, without generating.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.cells.get(coord)
    }

    /// Return the cell at `coord`, generating it first if absent.
    ///
    /// Idempotent: a resident cell is returned unchanged and the collider
    /// registry does not grow.
    pub fn get_or_create(&mut self, coord: CellCoord) -> &Cell {
        let config = &self.config;
        let colliders = &mut self.colliders;
        let events = &mut self.event_log;
        self.cells.get_or_insert_with(coord, |store| {
            let (cell_type, resolution) = choose_type(coord, store, config);
            let (cell, volumes) = materialize(coord, cell_type, resolution, config);
            tracing::debug!(
                %coord,
                cell_type = %cell.cell_type,
                road_type = %cell.road_type,
                ?resolution,
                colliders = volumes.len(),
                "generated cell"
            );
            colliders.extend(coord, volumes);
            events.push(WorldEvent::Generated {
                coord,
                cell_type: cell.cell_type,
                resolution: cell.resolution,
            });
            cell
        })
    }

    /// Drop a cell together with every collider it contributed.
    ///
    /// If the cell's `Generated` event is still in the log, that event is
    /// removed instead of recording an `Evicted` one, so the log never holds
    /// more entries than there are resident cells plus evictions of cells
    /// whose events were already drained.
    pub fn evict(&mut self, coord: CellCoord) -> Option<Cell> {
        let cell = self.cells.remove(coord)?;
        let removed = self.colliders.remove_owner(coord);
        tracing::debug!(%coord, colliders = removed, "evicted cell");
        let generated = self.event_log.iter().rposition(
            |e| matches!(e, WorldEvent::Generated { coord: c, .. } if *c == coord),
        );
        match generated {
            Some(i) => {
                self.event_log.remove(i);
            }
            None => self.event_log.push(WorldEvent::Evicted { coord }),
        }
        Some(cell)
    }

    /// Road surface under a world position, if that cell is resident.
    pub fn road_type_at(&self, position: Vec3) -> Option<RoadType> {
        self.cell(CellCoord::from_world(position, self.config.cell_size))
            .map(|c| c.road_type)
    }

    /// Traction multipliers at a position; unknown ground counts as Normal.
    pub fn surface_at(&self, position: Vec3) -> SurfaceModifiers {
        self.road_type_at(position)
            .unwrap_or(RoadType::Normal)
            .surface()
    }

    /// Whether a circle of `radius` around `position` touches a solid object.
    pub fn collides(&self, position: Vec3, radius: f32) -> bool {
        self.colliders.query(position, radius)
    }

    pub fn first_collision(&self, position: Vec3, radius: f32) -> Option<&BoundingVolume> {
        self.colliders.first_hit(position, radius)
    }

    /// Rebuild a world from an event log.
    pub fn replay(config: WorldConfig, events: &[WorldEvent]) -> Self {
        let mut world = Self {
            config,
            ..Default::default()
        };
        for event in events {
            match *event {
                WorldEvent::Generated {
                    coord,
                    cell_type,
                    resolution,
                } => {
                    if world.cells.contains(coord) {
                        continue;
                    }
                    let (cell, volumes) = materialize(coord, cell_type, resolution, &world.config);
                    world.colliders.extend(coord, volumes);
                    world.cells.insert(cell);
                    world.event_log.push(event.clone());
                }
                WorldEvent::Evicted { coord } => {
                    world.evict(coord);
                }
            }
        }
        world
    }

    /// Deterministic hash of the resident cells and colliders.
    /// Uses canonical (BTreeMap) iteration order.
    pub fn state_hash(&self) -> u64 {
        let mut h = Fnv1a::new();
        h.write_u64(self.config.seed);
        for cell in self.cells.iter() {
            h.write_i32(cell.coord.x);
            h.write_i32(cell.coord.y);
            h.write(&[cell.cell_type as u8, cell.road_type as u8]);
            for road in &cell.roads {
                h.write_f32(road.min.x);
                h.write_f32(road.min.y);
                h.write_f32(road.max.x);
                h.write_f32(road.max.y);
            }
            for d in &cell.content {
                h.write(&[d.shape as u8, d.tint.r, d.tint.g, d.tint.b, d.tint.a]);
                for v in [d.transform.position, d.transform.scale] {
                    h.write_f32(v.x);
                    h.write_f32(v.y);
                    h.write_f32(v.z);
                }
            }
            for v in self.colliders.owned_by(cell.coord) {
                for p in [v.min, v.max] {
                    h.write_f32(p.x);
                    h.write_f32(p.y);
                    h.write_f32(p.z);
                }
            }
        }
        h.finish()
    }
}

/// Type for a new cell: the origin is always the Highway spawn cell, every
/// other cell goes through the adjacency solver with a coordinate-seeded rng.
///
/// The spawn cell is exempt from adjacency, even when neighbors already exist
/// and the table does not allow Highway next to them.
fn choose_type(
    coord: CellCoord,
    store: &CellStore,
    config: &WorldConfig,
) -> (CellType, Resolution) {
    if coord == CellCoord::ORIGIN {
        return (CellType::Highway, Resolution::Spawn);
    }
    let mut rng = ChaCha8Rng::seed_from_u64(splitmix64(cell_seed(coord) ^ config.seed));
    resolve_type(coord, store, &config.adjacency, &mut rng)
}

fn materialize(
    coord: CellCoord,
    cell_type: CellType,
    resolution: Resolution,
    config: &WorldConfig,
) -> (Cell, Vec<BoundingVolume>) {
    if resolution == Resolution::Recovered {
        return (Cell::empty(coord), Vec::new());
    }
    match generate(coord, cell_type, config) {
        Ok(generated) => generated.into_cell(resolution),
        Err(e) => {
            tracing::warn!(%coord, %cell_type, error = %e, "generation failed, committing empty highway cell");
            (Cell::empty(coord), Vec::new())
        }
    }
}
