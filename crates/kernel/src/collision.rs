use glam::{Vec2, Vec3};
use roadworld_common::CellCoord;
use serde::{Deserialize, Serialize};

/// Axis-aligned solid box contributed by a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingVolume {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingVolume {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Exact circle-vs-rectangle test on the XZ plane.
    pub fn intersects_circle(&self, point: Vec3, radius: f32) -> bool {
        let c = self.center();
        let h = self.half_extents();
        // Distance from the point to the box, per axis, zero inside.
        let outside = (Vec2::new(point.x - c.x, point.z - c.z).abs() - Vec2::new(h.x, h.z))
            .max(Vec2::ZERO);
        let r = radius.max(0.0);
        outside.length_squared() <= r * r
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Collider {
    owner: CellCoord,
    volume: BoundingVolume,
}

/// Flat list of every solid volume placed so far.
///
/// Only content generation appends to it. Each volume remembers the cell
/// that produced it so eviction can drop exactly that cell's volumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionRegistry {
    colliders: Vec<Collider>,
}

impl CollisionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn push(&mut self, owner: CellCoord, volume: BoundingVolume) {
        self.colliders.push(Collider { owner, volume });
    }

    pub fn extend(&mut self, owner: CellCoord, volumes: impl IntoIterator<Item = BoundingVolume>) {
        self.colliders
            .extend(volumes.into_iter().map(|volume| Collider { owner, volume }));
    }

    /// Drop every volume owned by `owner`. Returns how many were removed.
    pub fn remove_owner(&mut self, owner: CellCoord) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.owner != owner);
        before - self.colliders.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundingVolume> {
        self.colliders.iter().map(|c| &c.volume)
    }

    pub fn owned_by(&self, owner: CellCoord) -> impl Iterator<Item = &BoundingVolume> {
        self.colliders
            .iter()
            .filter(move |c| c.owner == owner)
            .map(|c| &c.volume)
    }

    /// Whether a circle of `radius` around `point` (XZ plane) touches any volume.
    pub fn query(&self, point: Vec3, radius: f32) -> bool {
        self.first_hit(point, radius).is_some()
    }

    pub fn first_hit(&self, point: Vec3, radius: f32) -> Option<&BoundingVolume> {
        self.iter().find(|v| v.intersects_circle(point, radius))
    }
}
