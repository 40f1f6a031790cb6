use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gridpaint::models::{DrawConfig, DEFAULT_CONFIG_PATH};
use gridpaint::services::{
    spawn_listener, ClickPicker, Collaborators, DebugImages, ExecutionController, KeyConfirmation,
    PointerTracker, RdevPointer, RunOutcome, RunState, ScreenshotsCapture,
};

#[derive(Parser)]
#[command(name = "gridpaint")]
#[command(about = "Reproduce an image on an on-screen pixel canvas with mouse clicks")]
struct Cli {
    /// Image file to draw
    input: PathBuf,

    /// Erase every canvas cell before drawing
    #[arg(long)]
    clear: bool,

    /// Debug logging and intermediate detection images
    #[arg(long)]
    debug: bool,

    /// 0-based index of the display to capture (0 is the first display;
    /// capturing all screens at once is not supported)
    #[arg(long, default_value_t = 0)]
    monitor: usize,

    /// Settings file (YAML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Seed for color clustering; overrides the settings file
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "gridpaint=debug,swatch_match=debug"
    } else {
        "gridpaint=info,swatch_match=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match run(cli) {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    std::fs::metadata(&cli.input)
        .with_context(|| format!("Cannot read input image {}", cli.input.display()))?;

    let mut config = DrawConfig::load(&cli.config);
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    tracing::info!(
        input = %cli.input.display(),
        clear = cli.clear,
        monitor = cli.monitor,
        seed = config.seed.unwrap_or(0),
        "Starting"
    );
    tracing::info!("Esc stops, Space pauses or resumes");

    let state = Arc::new(RunState::new(config.pause_poll()));
    let tracker = Arc::new(PointerTracker::default());
    let channels = spawn_listener(Arc::clone(&state), Arc::clone(&tracker));

    let collaborators = Collaborators {
        capture: Box::new(ScreenshotsCapture::new(cli.monitor)),
        pointer: Box::new(RdevPointer::new(config.failsafe_delay(), tracker)),
        picker: Box::new(ClickPicker::new(channels.picks, Arc::clone(&state))),
        confirmation: Box::new(KeyConfirmation::new(channels.decisions)),
        listener: Some(channels.handle),
    };
    let debug = if cli.debug {
        DebugImages::enabled(&config.debug_dir)
    } else {
        DebugImages::disabled()
    };

    let mut controller = ExecutionController::new(config, state, collaborators).with_debug(debug);
    Ok(controller.run(&cli.input, cli.clear))
}
