//! Streaming: grid mapping and the window of generated cells around the observer.
//!
//! # Invariants
//! - After a tick the window around the observer's cell is resident, or is
//!   made resident by the next window read.
//! - A tick inside the same cell never touches the world.
//! - Eviction only removes cells outside the window, and only when a
//!   residency cap is configured.

mod grid;
mod streaming;

pub use grid::GridMapper;
pub use streaming::{MAX_STREAM_RADIUS, StreamConfig, StreamState, StreamStats, TickReport};

pub fn crate_info() -> &'static str {
    "roadworld-stream v0.1.0"
}
