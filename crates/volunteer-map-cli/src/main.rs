//! volunteer-map - find, join and create volunteer events from the terminal.
//!
//! The last event list is kept locally, so `map`, `show` and `share` keep
//! working without a connection.

mod app;
mod cli;
mod viewport;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{user_message, App};
use cli::{Cli, Commands};
use volunteer_map_core::config::Config;

/// Log file name prefix inside the data directory
const LOG_FILE_PREFIX: &str = "volunteer-map.log";

/// Initialize the tracing subscriber for logging.
///
/// Console output follows `RUST_LOG` (default `warn`); the daily log file in
/// `log_dir` always records `info` and above.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(console_filter))
        .with(file_layer)
        .init();

    guard
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Err(e) = config.apply_env() {
        warn!(error = %e, "Ignoring invalid environment override");
    }
    config
}

async fn run(cli: Cli, config: Config, data_dir: PathBuf) -> Result<()> {
    let mut app = App::new(config, data_dir)?;

    match cli.command {
        Commands::Login { email, remember } => app.login(email, remember).await,
        Commands::Logout { forget } => app.logout(forget),
        Commands::Map => app.map().await,
        Commands::Show { id } => app.show(&id).await,
        Commands::Volunteer { id } => app.volunteer(&id).await,
        Commands::Share { id } => app.share(&id).await,
        Commands::Upload { path } => app.upload(&path).await,
        Commands::Create(args) => app.create(args).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let data_dir = Config::data_dir().unwrap_or_else(|_| PathBuf::from("./volunteer-map-data"));

    let _guard = init_tracing(&data_dir.join("logs"));
    info!("volunteer-map starting");

    let config = load_config();

    match run(cli, config, data_dir).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Command failed");
            eprintln!("Error: {}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}
