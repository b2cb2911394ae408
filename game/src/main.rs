use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use engine::HeadlessRunner;
use engine::profiling::TickStats;
use engine::regression::json_sha256_hex;

use spellcast::hud::HudSnapshot;
use spellcast::landmarks::{LandmarkRecording, LandmarkSource};
use spellcast::playtest::PushScript;
use spellcast::render::{RenderFrame, Renderer};
use spellcast::settings::ConfigStore;
use spellcast::sfx::AudioCue;
use spellcast::{SpellInput, SpellcastLogic};

/// Headless spellcast run: scripted or recorded hands, no camera and no window.
#[derive(Parser, Debug)]
#[command(name = "spellcast", version)]
struct Args {
    /// Frames to simulate.
    #[arg(long, default_value_t = 1800)]
    frames: usize,
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
    /// Overrides the configured rng seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Landmark recording (JSON) to replay instead of scripted pushes.
    #[arg(long)]
    recording: Option<PathBuf>,
    /// Config file; defaults to SPELLCAST_CONFIG_PATH or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Milliseconds between scripted pushes.
    #[arg(long, default_value_t = 400.0)]
    push_every_ms: f64,
    /// Print a JSON summary instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default)]
struct FrameTally {
    frames: usize,
    peak_enemies: usize,
    peak_particles: usize,
}

impl Renderer for FrameTally {
    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.peak_enemies = self.peak_enemies.max(frame.enemies.len());
        self.peak_particles = self.peak_particles.max(frame.particles.len());
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    frames_run: usize,
    hud: HudSnapshot,
    casts: usize,
    cues: BTreeMap<String, usize>,
    peak_enemies: usize,
    peak_particles: usize,
    mean_tick_us: u128,
    max_tick_us: u128,
    digest: String,
}

fn main() -> Result<()> {
    let log_env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(log_env).init();
    let args = Args::parse();
    anyhow::ensure!(args.fps > 0.0, "--fps must be positive");

    let store = args
        .config
        .as_ref()
        .map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::from_env);
    let mut config = store.load();
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    log::info!(
        "config: {} (seed {})",
        store.path().display(),
        config.session.seed
    );

    let frame_ms = 1000.0 / args.fps;
    let mut source: Box<dyn LandmarkSource> = match &args.recording {
        Some(path) => Box::new(
            LandmarkRecording::load_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?
                .into_source()
                .with_context(|| format!("decoding {}", path.display()))?,
        ),
        None => Box::new(
            PushScript {
                frame_ms,
                push_every_ms: args.push_every_ms,
                ..PushScript::default()
            }
            .source(0.0, args.frames),
        ),
    };

    let mut runner = HeadlessRunner::new(SpellcastLogic::new(config));
    runner.step(SpellInput::Start {
        now_ms: 0.0,
        acquisition: Ok(()),
    });

    let mut stats = TickStats::default();
    let mut tally = FrameTally::default();
    let mut cues: Vec<AudioCue> = Vec::new();
    let mut casts = 0;
    let mut frames_run = 0;

    for i in 1..=args.frames {
        let now_ms = i as f64 * frame_ms;
        let detections = source.detect(now_ms);
        let report = runner.step_profiled(SpellInput::frame(now_ms, detections), &mut stats);
        casts += report.casts.len();
        runner.state().publish(&report, &mut tally, &mut cues);
        frames_run = i;

        if !runner.state().phase().is_running() {
            break;
        }
    }

    let game = runner.state();
    let hud = game.hud();
    let snapshot = game.session().snapshot();
    let digest = json_sha256_hex(&snapshot).context("hashing final snapshot")?;

    let mut cue_counts = BTreeMap::new();
    for cue in &cues {
        *cue_counts.entry(format!("{cue:?}")).or_insert(0) += 1;
    }

    let summary = Summary {
        frames_run,
        hud,
        casts,
        cues: cue_counts,
        peak_enemies: tally.peak_enemies,
        peak_particles: tally.peak_particles,
        mean_tick_us: stats.mean().as_micros(),
        max_tick_us: stats.max.as_micros(),
        digest,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.hud.status_line());
        println!("{}", summary.hud.hint_text());
        println!(
            "frames {} | casts {} | peak enemies {} | peak particles {}",
            summary.frames_run, summary.casts, summary.peak_enemies, summary.peak_particles
        );
        println!(
            "tick mean {}us max {}us | digest {}",
            summary.mean_tick_us, summary.max_tick_us, summary.digest
        );
    }
    Ok(())
}
