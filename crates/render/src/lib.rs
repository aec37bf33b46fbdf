//! Rendering adapter: turns resident cells into renderer-agnostic output.
//!
//! # Invariants
//! - Renderers never mutate world truth; they see cells through shared borrows.
//! - Output depends only on the frame's cells and the view.
//! - Per cell, the ground plane is drawn first, then roads, then content.

mod renderer;

pub use renderer::{
    DebugTextRenderer, DrawCommand, DrawLayer, DrawListRenderer, RenderFrame, RenderView, Renderer,
    ground_tint, road_tint,
};

pub fn crate_info() -> &'static str {
    "roadworld-render v0.1.0"
}
