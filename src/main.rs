//! Headless runner for the `lifesim` campaign.

use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use lifesim::{build_default_game, init_logging, InputState, SilentAudio};
use log::info;

/// Runs the action game simulation headless
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seed for world generation and every random roll
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Milliseconds per frame
    #[arg(long, default_value_t = 16.0)]
    frame_ms: f64,

    /// Write the final render snapshot of the current world as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    ensure!(
        args.frame_ms.is_finite() && args.frame_ms > 0.0,
        "frame length must be a positive number of milliseconds, got {}",
        args.frame_ms
    );

    let mut game = build_default_game(args.seed).context("failed to assemble the campaign")?;
    let input = InputState::default();
    let mut audio = SilentAudio;
    let mut fired = 0;
    for frame in 0..args.frames {
        let report = game
            .step(&input, args.frame_ms, &mut audio)
            .with_context(|| format!("frame {frame} failed"))?;
        fired += report.fired;
        if game.player_id().is_none() {
            info!("player died after {frame} frames");
            break;
        }
    }

    let world = game.current_world_mut()?;
    info!(
        "{}: {} entities after {:.1} s, {fired} shots fired",
        world.name(),
        world.len(),
        world.time_elapsed() / 1000.0
    );

    if let Some(path) = args.snapshot {
        let snapshot = world.render_snapshot();
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?;
        info!("wrote {} render items to {}", snapshot.len(), path.display());
    }
    Ok(())
}
