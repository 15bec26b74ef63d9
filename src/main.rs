use std::fs::{self, File};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use terminal_snake::config::{SessionConfig, config_path, default_log_path, load_session_config};
use terminal_snake::error::GameError;
use terminal_snake::game::{self, Game};
use terminal_snake::input::{CrosstermInput, ReversalPolicy};
use terminal_snake::renderer::TerminalRenderer;
use terminal_snake::terminal_runtime::{TerminalSession, install_panic_hook};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Game surface width in cells, border included.
    #[arg(long)]
    width: Option<u16>,

    /// Game surface height in cells, border included.
    #[arg(long)]
    height: Option<u16>,

    /// Starting speed, 1 (slowest) to 10.
    #[arg(long)]
    speed: Option<u8>,

    /// Seed for food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Ignore direction keys that would turn straight back into the body.
    #[arg(long = "no-reverse")]
    no_reverse: bool,

    /// Read session parameters from this JSON file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write diagnostics to this file.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Diagnostic filter, e.g. `info` or `terminal_snake=debug`.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig, GameError> {
        let path = self.config.clone().unwrap_or_else(config_path);
        let mut config = load_session_config(&path)?;

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(speed) = self.speed {
            config.initial_speed = speed;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.no_reverse {
            config.reversal = ReversalPolicy::Reject;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), GameError> {
    let cli = Cli::parse();

    init_logging(&cli);
    let config = cli.session_config()?;
    let mut game = Game::new(&config)?;

    install_panic_hook();

    info!(?config, "starting session");
    let mut session = TerminalSession::enter()?;
    let mut renderer =
        TerminalRenderer::new(session.terminal_mut(), game.surface(), config.log_lines);
    let mut input = CrosstermInput::new();

    game::run(&mut game, &mut renderer, &mut input)?;
    info!(food_count = game.food_count(), "session ended");
    Ok(())
}

fn init_logging(cli: &Cli) {
    let path = cli.log_file.clone().unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        if let Err(error) = fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {error}", parent.display());
            return;
        }
    }

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!("Failed to open log file {}: {error}", path.display());
            return;
        }
    };

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|error| {
        eprintln!("Invalid log level {:?}: {error}", cli.log_level);
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}
