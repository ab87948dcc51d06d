use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Deserialize;

use spar_core::schedule::Phase;
use spar_core::tracking::{RawDetection, TrackerConfig, TrackerHandle};
use spar_core::{Session, SessionConfig};
use spar_schema::{BeatMap, ChallengeLevel};

#[derive(Debug, Parser)]
#[command(name = "spar")]
#[command(about = "Sparring core toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a beat-map JSON for schema and ordering problems.
    Validate { input: PathBuf },
    /// Replay a recorded hand trace against a choreographed track and
    /// print the resulting session stats as JSON.
    Simulate {
        beatmap: PathBuf,
        trace: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1000.0)]
        width: f32,
        #[arg(long, default_value_t = 800.0)]
        height: f32,
    },
}

/// One recorded frame: host time plus whatever the landmark detector
/// reported. Frames without a detection still tick the scheduler.
#[derive(Debug, Deserialize)]
struct TraceFrame {
    at: f64,
    #[serde(default)]
    detection: Option<RawDetection>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate { input } => {
            let map = load_beat_map(&input)?;
            validate(&map).with_context(|| format!("invalid beat map: {}", input.display()))?;
            println!(
                "{}: {} bpm, offset {}s, {} punches ({})",
                map.name,
                map.bpm,
                map.offset,
                map.punches.len(),
                if map.is_scripted() {
                    "choreographed"
                } else {
                    "AI-driven"
                }
            );
        }
        Command::Simulate {
            beatmap,
            trace,
            output,
            width,
            height,
        } => {
            let map = load_beat_map(&beatmap)?;
            validate(&map).with_context(|| format!("invalid beat map: {}", beatmap.display()))?;
            let frames = load_trace(&trace)?;
            let stats = simulate(map, &frames, Vec2::new(width, height))?;

            let json =
                serde_json::to_string_pretty(&stats).context("failed to serialize stats")?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write: {}", path.display()))?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn load_beat_map(path: &Path) -> anyhow::Result<BeatMap> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read beat map: {}", path.display()))?;
    let map: BeatMap = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse beat map json: {}", path.display()))?;
    Ok(map)
}

fn load_trace(path: &Path) -> anyhow::Result<Vec<TraceFrame>> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read trace: {}", path.display()))?;
    let frames: Vec<TraceFrame> = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse trace json: {}", path.display()))?;
    Ok(frames)
}

fn validate(map: &BeatMap) -> anyhow::Result<()> {
    if !(map.bpm > 0.0) {
        anyhow::bail!("bpm must be positive, got {}", map.bpm);
    }
    if !map.is_sorted() {
        anyhow::bail!("punches must be sorted ascending by beat");
    }
    if let Some(event) = map.punches.iter().find(|e| !e.beat.is_finite()) {
        anyhow::bail!("non-finite beat position {:?}", event.beat);
    }
    Ok(())
}

/// Drives the session frame by frame. The playback clock is fed from the
/// trace timeline: audio starts the moment the countdown completes.
fn simulate(map: BeatMap, frames: &[TraceFrame], canvas: Vec2) -> anyhow::Result<spar_schema::SessionStats> {
    anyhow::ensure!(
        map.is_scripted(),
        "simulation needs a choreographed track (AI mode requires the live suggestion service)"
    );
    anyhow::ensure!(!frames.is_empty(), "trace contains no frames");

    let tracker = TrackerHandle::init(TrackerConfig::default())?.into_shared();
    let config = SessionConfig {
        level: ChallengeLevel::Medium,
        track: map,
        steering_hint: None,
        canvas,
    };
    let mut session = Session::new(config, tracker, None)?;
    let playback = session.playback_position();

    session.start(frames[0].at)?;
    let mut audio_started_at: Option<f64> = None;
    for frame in frames {
        if let Some(t0) = audio_started_at {
            playback.store(frame.at - t0, std::sync::atomic::Ordering::Release);
        }
        session
            .frame(frame.detection.as_ref(), frame.at)
            .map_err(anyhow::Error::from)
            .context("session aborted")?;
        if audio_started_at.is_none() && session.phase() == Phase::Active {
            audio_started_at = Some(frame.at);
        }
    }

    Ok(session.stop())
}
