use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roadworld_common::{
    CellCoord, CellType, ContentDescriptor, Rect2, RoadType, ShapeKind, Tint, Transform,
    WorldError, cell_seed,
};
use serde::{Deserialize, Serialize};

use crate::adjacency::Resolution;
use crate::cell::Cell;
use crate::collision::BoundingVolume;
use crate::config::WorldConfig;

/// Upper bound on placement attempts per cell; keeps a boundary crossing cheap.
pub const MAX_OBJECTS_PER_CELL: u32 = 64;

/// Probability that a Highway cell gets a dirt road.
const HIGHWAY_DIRT_CHANCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Building,
    Store,
    Cactus,
    Tree,
    Igloo,
}

/// How one cell type is furnished: `count` placement attempts of one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub kind: ObjectKind,
    pub count: u32,
    pub shape: ShapeKind,
    /// Full extents; the object rests on the ground.
    pub size: Vec3,
    pub tint: Tint,
}

impl ObjectSpec {
    fn check(&self) -> Result<(), String> {
        if self.count > MAX_OBJECTS_PER_CELL {
            return Err(format!(
                "{:?} count {} exceeds {}",
                self.kind, self.count, MAX_OBJECTS_PER_CELL
            ));
        }
        if !self.size.is_finite() || self.size.min_element() <= 0.0 {
            return Err(format!("{:?} size {} is not positive", self.kind, self.size));
        }
        Ok(())
    }
}

/// Cell type → object spec. Types without an entry stay empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentTable {
    specs: BTreeMap<CellType, ObjectSpec>,
}

impl Default for ContentTable {
    fn default() -> Self {
        let specs = [
            (
                CellType::City,
                ObjectSpec {
                    kind: ObjectKind::Building,
                    count: 5,
                    shape: ShapeKind::Cube,
                    size: Vec3::new(10.0, 50.0, 10.0),
                    tint: Tint::BLUE,
                },
            ),
            (
                CellType::Commercial,
                ObjectSpec {
                    kind: ObjectKind::Store,
                    count: 3,
                    shape: ShapeKind::Cube,
                    // Sized to the store collider (radius 5), not the 15-wide mesh.
                    size: Vec3::new(10.0, 10.0, 10.0),
                    tint: Tint::PURPLE,
                },
            ),
            (
                CellType::Desert,
                ObjectSpec {
                    kind: ObjectKind::Cactus,
                    count: 10,
                    shape: ShapeKind::Cube,
                    size: Vec3::new(1.0, 5.0, 1.0),
                    tint: Tint::GREEN,
                },
            ),
            (
                CellType::Forest,
                ObjectSpec {
                    kind: ObjectKind::Tree,
                    count: 20,
                    shape: ShapeKind::Cube,
                    size: Vec3::new(2.0, 10.0, 2.0),
                    tint: Tint::DARK_GREEN,
                },
            ),
            (
                CellType::Snow,
                ObjectSpec {
                    kind: ObjectKind::Igloo,
                    count: 2,
                    shape: ShapeKind::Sphere,
                    size: Vec3::new(10.0, 10.0, 10.0),
                    tint: Tint::WHITE,
                },
            ),
        ];
        Self {
            specs: specs.into_iter().collect(),
        }
    }
}

impl ContentTable {
    pub fn spec(&self, cell_type: CellType) -> Option<&ObjectSpec> {
        self.specs.get(&cell_type)
    }

    pub fn set(&mut self, cell_type: CellType, spec: Option<ObjectSpec>) {
        match spec {
            Some(spec) => self.specs.insert(cell_type, spec),
            None => self.specs.remove(&cell_type),
        };
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        self.specs
            .iter()
            .try_for_each(|(t, spec)| spec.check().map_err(|e| format!("{t}: {e}")))
    }
}

/// Output of [`generate`]: everything about a cell except how its type was chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCell {
    pub coord: CellCoord,
    pub cell_type: CellType,
    pub road_type: RoadType,
    pub roads: Vec<Rect2>,
    pub content: Vec<ContentDescriptor>,
    /// One volume per entry of `content`, same order.
    pub colliders: Vec<BoundingVolume>,
}

impl GeneratedCell {
    pub fn into_cell(self, resolution: Resolution) -> (Cell, Vec<BoundingVolume>) {
        let cell = Cell {
            coord: self.coord,
            cell_type: self.cell_type,
            road_type: self.road_type,
            resolution,
            roads: self.roads,
            content: self.content,
        };
        (cell, self.colliders)
    }
}

/// Populate a cell of the given type.
///
/// All randomness comes from a ChaCha8 stream seeded by [`cell_seed`], so the
/// result depends on `(coord, cell_type, config)` only. Candidates whose
/// footprint lands on a road are skipped, not retried; the origin cell is the
/// spawn point and only gets its central cross.
pub fn generate(
    coord: CellCoord,
    cell_type: CellType,
    config: &WorldConfig,
) -> Result<GeneratedCell, WorldError> {
    config
        .check_layout()
        .map_err(WorldError::GenerationFailure)?;
    let spec = config.content.spec(cell_type);
    if let Some(spec) = spec {
        spec.check()
            .map_err(|e| WorldError::GenerationFailure(format!("{cell_type}: {e}")))?;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(coord));
    let road_type = road_type_for(cell_type, &mut rng);
    let roads = road_layout(coord, cell_type, config);

    let mut content = Vec::new();
    let mut colliders = Vec::new();
    if let Some(spec) = spec.filter(|_| coord != CellCoord::ORIGIN) {
        let origin = cell_origin(coord, config.cell_size);
        for _ in 0..spec.count {
            let x = origin.x + rng.random::<f32>() * config.cell_size;
            let z = origin.y + rng.random::<f32>() * config.cell_size;
            let footprint = Rect2::from_center(Vec2::new(x, z), Vec2::new(spec.size.x, spec.size.z));
            if roads.iter().any(|road| road.overlaps(&footprint)) {
                continue;
            }
            let position = Vec3::new(x, spec.size.y * 0.5, z);
            content.push(ContentDescriptor {
                shape: spec.shape,
                transform: Transform {
                    position,
                    scale: spec.size,
                },
                tint: spec.tint,
            });
            colliders.push(BoundingVolume::from_center_size(position, spec.size));
        }
    }

    tracing::trace!(%coord, %cell_type, %road_type, objects = content.len(), "cell generated");

    Ok(GeneratedCell {
        coord,
        cell_type,
        road_type,
        roads,
        content,
        colliders,
    })
}

fn road_type_for<R: Rng + ?Sized>(cell_type: CellType, rng: &mut R) -> RoadType {
    match cell_type {
        CellType::Forest => RoadType::Dirt,
        CellType::Snow => RoadType::Ice,
        CellType::Highway if rng.random_bool(HIGHWAY_DIRT_CHANCE) => RoadType::Dirt,
        _ => RoadType::Normal,
    }
}

/// South-west corner of a cell on the XZ plane.
fn cell_origin(coord: CellCoord, cell_size: f32) -> Vec2 {
    Vec2::new(coord.x as f32 * cell_size, coord.y as f32 * cell_size)
}

/// Road strips of a cell: a cross through the center, plus a ring of
/// back-roads one road width in from the edges for City and Commercial cells.
pub fn road_layout(coord: CellCoord, cell_type: CellType, config: &WorldConfig) -> Vec<Rect2> {
    let size = config.cell_size;
    let w = config.road_width;
    let min = cell_origin(coord, size);
    let max = min + Vec2::splat(size);
    let center = min + Vec2::splat(size * 0.5);

    let mut roads = vec![
        Rect2::new(
            Vec2::new(min.x, center.y - w * 0.5),
            Vec2::new(max.x, center.y + w * 0.5),
        ),
        Rect2::new(
            Vec2::new(center.x - w * 0.5, min.y),
            Vec2::new(center.x + w * 0.5, max.y),
        ),
    ];
    if cell_type.has_back_roads() && coord != CellCoord::ORIGIN {
        // Ring strips are centred one road width in from each edge.
        let near = min + Vec2::splat(w);
        let far = max - Vec2::splat(w);
        roads.extend([
            Rect2::from_center(Vec2::new(center.x, near.y), Vec2::new(size, w)),
            Rect2::from_center(Vec2::new(center.x, far.y), Vec2::new(size, w)),
            Rect2::from_center(Vec2::new(near.x, center.y), Vec2::new(w, size)),
            Rect2::from_center(Vec2::new(far.x, center.y), Vec2::new(w, size)),
        ]);
    }
    roads
}
