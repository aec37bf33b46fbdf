//! World Kernel: authoritative cell store, adjacency solving, seeded content
//! generation and the collider registry.
//!
//! # Invariants
//! - At most one cell per coordinate; a committed cell is never mutated.
//! - Cell content depends on `(coordinate, type)` alone, never on generation order.
//! - Colliders are added and removed together with the cell that owns them.

pub mod adjacency;
pub mod cell;
pub mod collision;
pub mod config;
pub mod generator;
pub mod store;
pub mod world;

pub use adjacency::{AdjacencyTable, Resolution, resolve_type};
pub use cell::Cell;
pub use collision::{BoundingVolume, CollisionRegistry};
pub use config::WorldConfig;
pub use generator::{ContentTable, GeneratedCell, ObjectKind, ObjectSpec, generate, road_layout};
pub use store::CellStore;
pub use world::{World, WorldEvent};

pub fn crate_info() -> &'static str {
    "roadworld-kernel v0.1.0"
}
