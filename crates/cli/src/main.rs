mod player;
mod scenario;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clip_engine::error::read_json_file;
use clip_engine::{Clip, SyncConfig, compute_ranges, total_virtual_duration};
use serde::Serialize;
use tracing::info;

use crate::scenario::{Scenario, replay};

#[derive(Parser)]
#[command(name = "clipsync")]
#[command(about = "Clip playback synchronization engine - replay and inspect sessions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the virtual timeline for a clip list
    Ranges {
        /// JSON array of `{ "start_time", "end_time" }` clips
        clips: PathBuf,
    },

    /// Replay a scripted session and print player commands and engine events as JSON lines
    Replay {
        /// Scenario file path
        scenario: PathBuf,

        /// Sync config overriding the scenario's own
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct RangesReport {
    ranges: Vec<clip_engine::ClipRange>,
    total_virtual_duration: f64,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Ranges { clips } => print_ranges(clips),
        Commands::Replay { scenario, config } => run_replay(scenario, config),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_ranges(path: PathBuf) -> Result<()> {
    let clips: Vec<Clip> = read_json_file("failed to read clip list", &path)?;
    let ranges = compute_ranges(&clips);
    let report = RangesReport {
        total_virtual_duration: total_virtual_duration(&ranges),
        ranges,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to encode ranges")?;
    println!("{json}");
    Ok(())
}

fn run_replay(scenario_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let scenario: Scenario = read_json_file("failed to read scenario", &scenario_path)?;
    let config = config_path
        .as_deref()
        .map(SyncConfig::from_json_file)
        .transpose()?;

    info!(
        path = %scenario_path.display(),
        clip_count = scenario.clips.len(),
        step_count = scenario.steps.len(),
        "replaying scenario"
    );
    let records = replay(scenario, config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        let line = serde_json::to_string(record).context("failed to encode replay record")?;
        writeln!(out, "{line}").context("failed to write replay output")?;
    }
    Ok(())
}
