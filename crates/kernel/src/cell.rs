use roadworld_common::{CellCoord, CellType, ContentDescriptor, Rect2, RoadType};
use serde::{Deserialize, Serialize};

use crate::adjacency::Resolution;

/// One generated unit of the grid.
///
/// Built exactly once per coordinate and never mutated afterwards, even when
/// neighbors generated later would have constrained it differently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: CellCoord,
    pub cell_type: CellType,
    pub road_type: RoadType,
    /// How `cell_type` was chosen.
    pub resolution: Resolution,
    /// Road strips on the XZ plane. Nothing in `content` overlaps them.
    pub roads: Vec<Rect2>,
    /// Placed objects in placement order.
    pub content: Vec<ContentDescriptor>,
}

impl Cell {
    /// Bare Highway cell committed when generation fails.
    pub fn empty(coord: CellCoord) -> Self {
        Self {
            coord,
            cell_type: CellType::Highway,
            road_type: RoadType::Normal,
            resolution: Resolution::Recovered,
            roads: Vec::new(),
            content: Vec::new(),
        }
    }
}
