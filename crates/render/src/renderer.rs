use std::fmt::Write as _;

use glam::{Vec2, Vec3};
use roadworld_common::{CellType, ContentDescriptor, RoadType, ShapeKind, Tint, Transform};
use roadworld_kernel::Cell;
use serde::{Deserialize, Serialize};

/// Road planes sit just above the ground plane.
const ROAD_LIFT: f32 = 0.01;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self::chase(Vec3::ZERO)
    }
}

impl RenderView {
    /// Chase camera: behind and above the target, looking at it.
    pub fn chase(target: Vec3) -> Self {
        Self {
            eye: target + Vec3::new(-5.0, 2.0, -5.0),
            target,
            fov_degrees: 45.0,
        }
    }
}

/// The cells visible this frame, borrowed from the world.
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub seed: u64,
    pub cell_size: f32,
    pub cells: Vec<&'a Cell>,
}

/// Which pass of a cell a draw command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawLayer {
    Ground,
    Road,
    Content,
}

/// One primitive to draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub layer: DrawLayer,
    pub descriptor: ContentDescriptor,
}

/// Ground color of a cell type.
pub fn ground_tint(cell_type: CellType) -> Tint {
    match cell_type {
        CellType::Highway => Tint::GRAY,
        CellType::City => Tint::DARK_GRAY,
        CellType::Commercial => Tint::GRAY,
        CellType::Desert => Tint::YELLOW,
        CellType::Forest => Tint::GREEN,
        CellType::Snow => Tint::WHITE,
    }
}

/// Surface color of a road type.
pub fn road_tint(road_type: RoadType) -> Tint {
    match road_type {
        RoadType::Normal => Tint::DARK_GRAY,
        RoadType::Dirt => Tint::BROWN,
        RoadType::Ice => Tint::SKY_BLUE,
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a frame of resident cells and a view configuration,
/// then produces output. Cells are borrowed immutably; world truth stays
/// with the kernel.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given cells and view.
    fn render(&self, frame: &RenderFrame<'_>, view: &RenderView) -> Self::Output;
}

/// Produces the ordered draw list a graphics backend would submit.
#[derive(Debug, Default)]
pub struct DrawListRenderer;

impl DrawListRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw commands for a single cell: ground, roads, then content.
    pub fn cell_commands(cell: &Cell, cell_size: f32) -> Vec<DrawCommand> {
        let mut out = Vec::with_capacity(1 + cell.roads.len() + cell.content.len());

        let origin = Vec2::new(cell.coord.x as f32, cell.coord.y as f32) * cell_size;
        let center = origin + Vec2::splat(cell_size * 0.5);
        out.push(DrawCommand {
            layer: DrawLayer::Ground,
            descriptor: ContentDescriptor {
                shape: ShapeKind::Plane,
                transform: Transform {
                    position: Vec3::new(center.x, 0.0, center.y),
                    scale: Vec3::new(cell_size, 0.0, cell_size),
                },
                tint: ground_tint(cell.cell_type),
            },
        });

        let tint = road_tint(cell.road_type);
        for road in &cell.roads {
            let c = road.center();
            let size = road.size();
            out.push(DrawCommand {
                layer: DrawLayer::Road,
                descriptor: ContentDescriptor {
                    shape: ShapeKind::Plane,
                    transform: Transform {
                        position: Vec3::new(c.x, ROAD_LIFT, c.y),
                        scale: Vec3::new(size.x, 0.0, size.y),
                    },
                    tint,
                },
            });
        }

        out.extend(cell.content.iter().map(|d| DrawCommand {
            layer: DrawLayer::Content,
            descriptor: *d,
        }));
        out
    }
}

impl Renderer for DrawListRenderer {
    type Output = Vec<DrawCommand>;

    fn render(&self, frame: &RenderFrame<'_>, _view: &RenderView) -> Vec<DrawCommand> {
        let out: Vec<DrawCommand> = frame
            .cells
            .iter()
            .flat_map(|cell| Self::cell_commands(cell, frame.cell_size))
            .collect();
        tracing::trace!(cells = frame.cells.len(), commands = out.len(), "built draw list");
        out
    }
}

/// Debug text renderer.
///
/// Produces a human-readable summary of the frame. Useful for CLI output,
/// logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &RenderFrame<'_>, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Road World (seed={}, cells={}) ===",
            frame.seed,
            frame.cells.len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        );

        for cell in &frame.cells {
            let _ = writeln!(
                out,
                "  {} {:<10} road={:<6} roads={} objects={}",
                cell.coord,
                cell.cell_type.to_string(),
                cell.road_type.to_string(),
                cell.roads.len(),
                cell.content.len()
            );
        }

        out
    }
}
