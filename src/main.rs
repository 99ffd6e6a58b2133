use std::fs::File;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use sneak_snake::config::GridConfig;
use sneak_snake::game::{GameStatus, World};
use sneak_snake::input::GameInput;
use sneak_snake::terminal_runtime::{TerminalSession, restore_terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(about = "Snake with a limited number of whole-body reversals")]
struct Cli {
    /// JSON file overriding grid size, cell size, or tick interval.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for food placement, for reproducible sessions.
    #[arg(long)]
    seed: Option<u64>,

    /// Write simulation logs to this file (filtered by `RUST_LOG`).
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => GridConfig::load(path).map_err(io::Error::other)?,
        None => GridConfig::default(),
    };

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let world = match cli.seed {
        Some(seed) => World::new_with_seed(config, seed),
        None => World::new(config),
    }
    .map_err(io::Error::other)?;
    info!(?config, seed = ?cli.seed, "starting session");

    install_panic_hook();
    run(world)
}

fn run(mut world: World) -> io::Result<()> {
    let mut session = TerminalSession::enter()?;
    let started = Instant::now();

    loop {
        session.draw(&world.snapshot(), world.config())?;

        if let Some(input) = session.poll_input(FRAME_INTERVAL)? {
            if input == GameInput::Quit {
                break;
            }
            world.apply_input(input);
        }

        if world.status() == GameStatus::Playing {
            let timestamp_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            world.tick(timestamp_ms);
        }
    }

    info!(score = world.score(), status = ?world.status(), "session ended");
    Ok(())
}

fn init_logging(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        default_hook(panic_info);
    }));
}
