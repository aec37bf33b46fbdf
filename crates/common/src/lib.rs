//! Common: grid coordinates, cell classification, content descriptors, hashing.
//!
//! # Invariants
//! - Coordinate mapping floors toward negative infinity.
//! - Hashing is stable across platforms and runs (no `std` `RandomState`).

mod error;
mod hash;
mod types;

pub use error::WorldError;
pub use hash::{Fnv1a, cell_seed, splitmix64};
pub use types::{
    CELL_SIZE, CellCoord, CellType, CellTypeSet, ContentDescriptor, ROAD_WIDTH, Rect2, RoadType,
    ShapeKind, SurfaceModifiers, Tint, Transform,
};

pub fn crate_info() -> &'static str {
    "roadworld-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
