use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand};
use earth_scene_core::{
    AppConfig, AssetStore, AudioTrack, HeadlessRenderer, PlaybackClock, PlaybackHandle,
    PlaybackSource, Recorder, RecordingSettings, Renderer, Stage,
};
use tracing_subscriber::EnvFilter;

fn main() -> earth_scene_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(root) = &cli.asset_root {
        config.assets.root = root.clone();
    }

    match cli.command {
        Commands::Play {
            scene,
            from,
            duration,
        } => run_play(&mut config, &scene, from, duration),
        Commands::Inspect { scene, at } => run_inspect(&mut config, &scene, at),
        Commands::Record {
            scene,
            output,
            fps,
            start,
            end,
        } => run_record(&mut config, &scene, output, fps, start, end),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn build_stage(config: &mut AppConfig, scene: &SceneArgs) -> earth_scene_core::Result<Stage> {
    if let Some(user) = &scene.user {
        config.text.user = user.clone();
    }
    config.validate()?;

    let mut assets = AssetStore::new(config.assets.root.clone());
    let mut stage = Stage::build(config, &mut assets)?;
    for assignment in &scene.set {
        stage.panel_mut().assign(assignment)?;
    }
    Ok(stage)
}

fn run_play(
    config: &mut AppConfig,
    scene: &SceneArgs,
    from: f32,
    duration: Option<f32>,
) -> earth_scene_core::Result<()> {
    let mut stage = build_stage(config, scene)?;
    let track = AudioTrack::from_config(&config.audio);
    tracing::info!(track = %track.path().display(), from, "starting playback");

    let clock = PlaybackHandle::new(PlaybackClock::for_track(&track, config.audio.playback_rate));
    clock.seek(from);
    clock.play();

    let mut renderer = HeadlessRenderer::new();
    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.renderer.fps));
    let limit = duration.and_then(|secs| Duration::try_from_secs_f32(secs).ok());
    let started = Instant::now();

    loop {
        let frame = stage.tick(clock.current_time());
        renderer.render(&frame)?;

        if clock.is_finished() || limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
        std::thread::sleep(frame_interval);
    }

    tracing::info!(
        frames = renderer.frames_drawn(),
        position = clock.current_time(),
        "playback finished"
    );
    Ok(())
}

fn run_inspect(
    config: &mut AppConfig,
    scene: &SceneArgs,
    mut at: Vec<f32>,
) -> earth_scene_core::Result<()> {
    let mut stage = build_stage(config, scene)?;
    at.sort_by(f32::total_cmp);
    for t in at {
        let frame = stage.replay_to(t.max(0.0), config.renderer.fps);
        println!("{}", serde_json_pretty(&frame)?);
    }
    Ok(())
}

fn run_record(
    config: &mut AppConfig,
    scene: &SceneArgs,
    output: PathBuf,
    fps: Option<u32>,
    start: f32,
    end: Option<f32>,
) -> earth_scene_core::Result<()> {
    let mut stage = build_stage(config, scene)?;
    let settings = RecordingSettings {
        output_path: output,
        fps: fps.unwrap_or(config.renderer.fps),
        start_seconds: start,
        end_seconds: end
            .or(config.audio.duration_seconds)
            .unwrap_or(RecordingSettings::default().end_seconds),
    };
    tracing::info!(?settings, "recording");
    Recorder::new(settings).record_to_file(&mut stage)?;
    Ok(())
}

fn serde_json_pretty(frame: &earth_scene_core::FrameSnapshot) -> earth_scene_core::Result<String> {
    Ok(serde_json::to_string_pretty(frame)?)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Audio-synchronised Earth scene", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Directory the asset paths are resolved against.
    #[arg(long, global = true)]
    asset_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SceneArgs {
    /// Name shown as extruded text next to the label.
    #[arg(short, long)]
    user: Option<String>,
    /// Debug panel override, e.g. `sun_phi=1.2` or `atmosphere_day_color=#00aaff`.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    set: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the scene in real time from a playback clock.
    Play {
        #[command(flatten)]
        scene: SceneArgs,
        /// Audio position to start from, in seconds.
        #[arg(long, default_value_t = 0.0)]
        from: f32,
        /// Stop after this many wall-clock seconds.
        #[arg(long)]
        duration: Option<f32>,
    },
    /// Print the resolved frame at one or more audio positions.
    Inspect {
        #[command(flatten)]
        scene: SceneArgs,
        /// Audio positions in seconds.
        #[arg(long, required = true, num_args = 1..)]
        at: Vec<f32>,
    },
    /// Render the timeline offline into a JSON Lines file.
    Record {
        #[command(flatten)]
        scene: SceneArgs,
        /// Output path for the frame snapshots.
        #[arg(short, long)]
        output: PathBuf,
        /// Frames per second; defaults to the configured renderer rate.
        #[arg(long)]
        fps: Option<u32>,
        #[arg(long, default_value_t = 0.0)]
        start: f32,
        /// Defaults to the configured track duration.
        #[arg(long)]
        end: Option<f32>,
    },
    /// Print the effective configuration as TOML.
    Config,
}
