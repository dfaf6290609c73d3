use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::{GameConfig, GameEngine};
use grid_snake::modes::{HeadlessMode, HumanMode};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Single-player snake on a fixed grid")]
struct Cli {
    /// How the game is presented
    #[arg(long, default_value = "human")]
    mode: Mode,

    /// Grid width and height (3 to 100)
    #[arg(long, default_value = "20")]
    grid_size: usize,

    /// Milliseconds between two simulation steps
    #[arg(long, default_value = "150")]
    tick_ms: u64,

    /// Seed for food placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (human mode draws over stderr, so logs are
    /// discarded there unless a file is given)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Human,
    /// Read commands from stdin and print JSON snapshots to stdout
    Headless,
}

fn init_tracing(mode: Mode, log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (log_file, mode) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
        }
        (None, Mode::Headless) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .compact()
                .with_writer(std::io::stderr)
                .try_init();
        }
        // The terminal belongs to the UI; nowhere to log to
        (None, Mode::Human) => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.mode, cli.log_file.as_ref())?;

    // Create game configuration from CLI arguments
    let config = GameConfig::new(cli.grid_size)
        .with_tick_interval(Duration::from_millis(cli.tick_ms));
    config.validate().context("Invalid game configuration")?;

    let engine = match cli.seed {
        Some(seed) => GameEngine::with_seed(config, seed),
        None => GameEngine::new(config),
    };
    info!(
        grid_size = cli.grid_size,
        tick_ms = cli.tick_ms,
        seed = ?cli.seed,
        "starting grid_snake"
    );

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Human => HumanMode::new(engine).run().await?,
        Mode::Headless => {
            let mut headless = HeadlessMode::new(engine);
            headless.run(BufReader::new(stdin()), stdout()).await?;
        }
    }

    Ok(())
}
