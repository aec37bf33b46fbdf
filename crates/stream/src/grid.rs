use glam::Vec3;
use roadworld_common::CellCoord;

/// Maps continuous world positions onto the cell grid.
///
/// Only X and Z take part; height is ignored. Cells are `cell_size` squares
/// whose south-west corner sits at `(x * cell_size, z * cell_size)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    cell_size: f32,
}

impl GridMapper {
    /// Create a mapper for the given cell size.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive"
        );
        Self { cell_size }
    }

    /// Cell size used for this mapping.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Convert a world position to a cell coordinate.
    pub fn position_to_cell(&self, pos: Vec3) -> CellCoord {
        CellCoord::from_world(pos, self.cell_size)
    }

    /// South-west corner of a cell, at ground level.
    pub fn cell_origin(&self, coord: CellCoord) -> Vec3 {
        Vec3::new(
            coord.x as f32 * self.cell_size,
            0.0,
            coord.y as f32 * self.cell_size,
        )
    }

    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        self.cell_origin(coord) + Vec3::new(self.cell_size * 0.5, 0.0, self.cell_size * 0.5)
    }

    /// Where the observer starts: on the road crossing of the origin cell.
    pub fn spawn_point(&self) -> Vec3 {
        self.cell_center(CellCoord::ORIGIN)
    }

    /// All cells of the square window around `center`, row by row.
    ///
    /// Coordinates that would leave the addressable grid are skipped.
    pub fn cells_in_radius(&self, center: CellCoord, radius: i32) -> Vec<CellCoord> {
        let mut result = Vec::new();
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                match center.checked_offset(dx, dy) {
                    Ok(c) => result.push(c),
                    Err(e) => tracing::warn!(error = %e, "window cell outside the grid"),
                }
            }
        }
        result
    }
}
