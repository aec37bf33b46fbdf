use roadworld_common::{CELL_SIZE, ROAD_WIDTH, WorldError};
use serde::{Deserialize, Serialize};

use crate::adjacency::AdjacencyTable;
use crate::generator::ContentTable;

/// Everything that shapes generation. Two worlds with equal configs and the
/// same sequence of requests produce identical cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Mixed into type selection; content placement depends on the coordinate only.
    pub seed: u64,
    /// Edge length of a cell in world units.
    pub cell_size: f32,
    /// Width of each road strip.
    pub road_width: f32,
    pub adjacency: AdjacencyTable,
    pub content: ContentTable,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            cell_size: CELL_SIZE,
            road_width: ROAD_WIDTH,
            adjacency: AdjacencyTable::default(),
            content: ContentTable::default(),
        }
    }
}

impl WorldConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), WorldError> {
        self.check_layout().map_err(WorldError::Config)?;
        self.content.check().map_err(WorldError::Config)?;
        if !self.adjacency.is_symmetric() {
            tracing::warn!("adjacency table is not symmetric; neighbor pairs depend on generation order");
        }
        Ok(())
    }

    /// The central cross and the back-road ring must not touch.
    pub(crate) fn check_layout(&self) -> Result<(), String> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(format!("cell_size must be positive, got {}", self.cell_size));
        }
        if !(self.road_width.is_finite() && self.road_width > 0.0) {
            return Err(format!("road_width must be positive, got {}", self.road_width));
        }
        // Ring strips reach 1.5 road widths in from the edge; the cross starts
        // half a width before the center.
        if self.road_width * 4.0 >= self.cell_size {
            return Err(format!(
                "road_width {} leaves no room between roads in a cell of {}",
                self.road_width, self.cell_size
            ));
        }
        Ok(())
    }
}
