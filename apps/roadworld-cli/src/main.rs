mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use roadworld_common::CellCoord;
use roadworld_kernel::World;
use roadworld_render::{DebugTextRenderer, RenderFrame, RenderView, Renderer};
use roadworld_stream::StreamState;
use tracing_subscriber::EnvFilter;

use crate::config::SessionConfig;

/// Collision radius of the driven observer.
const OBSERVER_RADIUS: f32 = 1.0;

#[derive(Parser)]
#[command(name = "roadworld-cli", about = "CLI tool for road-world operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Drive an observer in a straight line, streaming cells as it goes
    Drive {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "200")]
        ticks: u32,
        /// Distance covered per frame on a normal road
        #[arg(long, default_value = "1.5")]
        speed: f32,
        /// Heading in degrees, 0 = +Z, 90 = +X
        #[arg(long, default_value = "90", allow_negative_numbers = true)]
        heading: f32,
        /// World seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        /// JSON file with `world` and `stream` sections
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate a single cell and print it
    Inspect {
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        #[arg(short, long, default_value = "0")]
        seed: u64,
        /// Print the cell as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stream the window around a world position and print it
    Render {
        #[arg(long, allow_negative_numbers = true)]
        x: f32,
        #[arg(long, allow_negative_numbers = true)]
        z: f32,
        #[arg(short, long, default_value = "0")]
        seed: u64,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("roadworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", roadworld_common::crate_info());
            println!("kernel: {}", roadworld_kernel::crate_info());
            println!("stream: {}", roadworld_stream::crate_info());
            println!("render: {}", roadworld_render::crate_info());
        }
        Commands::Drive {
            ticks,
            speed,
            heading,
            seed,
            config,
        } => {
            let seed = seed.unwrap_or_else(rand::random::<u64>);
            let session = SessionConfig::resolve(config.as_deref(), Some(seed))?;
            drive(session, ticks, speed, heading)?;
        }
        Commands::Inspect { x, y, seed, json } => {
            let mut world = World::with_seed(seed);
            let cell = world.get_or_create(CellCoord::new(x, y));
            if json {
                println!("{}", serde_json::to_string_pretty(cell)?);
            } else {
                println!(
                    "cell {}: type={} road={} resolution={:?}",
                    cell.coord, cell.cell_type, cell.road_type, cell.resolution
                );
                for road in &cell.roads {
                    println!(
                        "  road ({:.1}, {:.1})..({:.1}, {:.1})",
                        road.min.x, road.min.y, road.max.x, road.max.y
                    );
                }
                for d in &cell.content {
                    let p = d.transform.position;
                    let s = d.transform.scale;
                    println!(
                        "  {:?} pos=({:.2}, {:.2}, {:.2}) size=({:.1}, {:.1}, {:.1})",
                        d.shape, p.x, p.y, p.z, s.x, s.y, s.z
                    );
                }
            }
        }
        Commands::Render { x, z, seed, config } => {
            let session = SessionConfig::resolve(config.as_deref(), Some(seed))?;
            let mut world = World::with_config(session.world)?;
            let mut stream = StreamState::for_world(session.stream, &world);
            stream.prime(&mut world);

            let position = Vec3::new(x, 0.0, z);
            stream.tick(position, &mut world);
            let seed = world.seed();
            let cell_size = world.cell_size();
            let frame = RenderFrame {
                seed,
                cell_size,
                cells: stream.resident_window(&mut world),
            };
            print!(
                "{}",
                DebugTextRenderer::new().render(&frame, &RenderView::chase(position))
            );
        }
    }

    Ok(())
}

fn drive(session: SessionConfig, ticks: u32, speed: f32, heading: f32) -> anyhow::Result<()> {
    let replay_config = session.world.clone();
    let mut world = World::with_config(session.world).context("building world")?;
    let mut stream = StreamState::for_world(session.stream, &world);
    stream.prime(&mut world);

    let direction = {
        let h = heading.to_radians();
        Vec3::new(h.sin(), 0.0, h.cos())
    };
    let mut position = stream.mapper().spawn_point();
    println!(
        "Drive: seed={}, ticks={ticks}, speed={speed}, heading={heading}",
        world.seed()
    );

    let mut generated = 0usize;
    let mut evicted = 0usize;
    let mut frames = 0u32;
    for _ in 0..ticks {
        let surface = world.surface_at(position);
        let next = position + direction * speed * surface.acceleration;
        if world.collides(next, OBSERVER_RADIUS) {
            tracing::info!(
                x = next.x,
                z = next.z,
                cell = %stream.mapper().position_to_cell(next),
                "blocked by an object"
            );
            println!("Blocked at ({:.1}, {:.1}) after {frames} frames", position.x, position.z);
            break;
        }
        position = next;
        let report = stream.tick(position, &mut world);
        generated += report.generated.len();
        evicted += report.evicted.len();
        frames += 1;
    }

    let stats = stream.stats();
    println!(
        "Position: ({:.1}, {:.1}) in cell {} on {:?} road",
        position.x,
        position.z,
        stream.center(),
        world.road_type_at(position)
    );
    println!(
        "Cells: resident={}, generated={generated}, evicted={evicted}, colliders={}",
        world.cell_count(),
        world.collider_count()
    );
    println!("Last tick: {:?}", stats.tick_time);

    let hash = world.state_hash();
    let events = world.drain_events();
    let replayed = World::replay(replay_config, &events);
    println!(
        "State hash: {hash:#x} ({} events, replay {})",
        events.len(),
        if replayed.state_hash() == hash {
            "OK"
        } else {
            "MISMATCH"
        }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drive_with_defaults() {
        let cli = Cli::try_parse_from(["roadworld-cli", "drive", "--seed", "7"]).unwrap();
        match cli.command {
            Commands::Drive {
                ticks,
                seed,
                config,
                ..
            } => {
                assert_eq!(ticks, 200);
                assert_eq!(seed, Some(7));
                assert!(config.is_none());
            }
            _ => panic!("expected drive"),
        }
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["roadworld-cli", "-v", "inspect", "--x", "-3", "--y", "12", "--json"])
                .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Inspect { x, y, json, .. } => {
                assert_eq!((x, y), (-3, 12));
                assert!(json);
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn render_requires_position() {
        assert!(Cli::try_parse_from(["roadworld-cli", "render", "--x", "10"]).is_err());
    }

    #[test]
    fn drive_runs_to_completion() {
        let session = SessionConfig::resolve(None, Some(3)).unwrap();
        assert!(drive(session, 50, 2.0, 45.0).is_ok());
    }
}
