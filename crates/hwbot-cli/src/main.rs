//! Homework Bot CLI
//!
//! Main entry point: polls the homework API and reports status changes to a
//! Telegram chat until killed.

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use hwbot_core::{
    Credentials, EnvCredentials, PollerError, Poller, PracticumClient, Settings, TelegramNotifier,
};

/// Homework Bot - homework review status notifier
///
/// Checks the review status of the latest homework every retry period and
/// sends a Telegram message whenever it changes.
#[derive(Parser, Debug)]
#[command(name = "homework-bot")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to settings file (default: hwbot.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to a dotenv file with credentials (default: .env)
    #[arg(short, long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Enable verbose output (sets log level to debug for all crates)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    load_env_file(args.env_file.as_deref());

    let settings = match load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = logging::init(
        args.verbose,
        Path::new(&settings.log_file),
        settings.log_max_bytes,
    ) {
        eprintln!("Error: cannot open log file '{}': {e}", settings.log_file);
        return ExitCode::from(1);
    }

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads credentials from a dotenv file into the environment.
///
/// A missing default `.env` is fine; the credentials check reports anything
/// still absent.
fn load_env_file(path: Option<&Path>) {
    let result = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    if let Err(e) = result {
        if path.is_some() || !e.not_found() {
            eprintln!("Warning: failed to load env file: {e}");
        }
    }
}

/// Loads settings from the specified path or default location.
fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Settings file not found: {}\n\nSuggestion: Check the path or omit --config to use defaults",
                    path.display()
                );
            }
            Ok(Settings::load_from_file(path)?)
        }
        None => {
            let dir = std::env::current_dir()?;
            Ok(Settings::load_from_dir(&dir)?)
        }
    }
}

/// Builds the clients and runs the poll loop until credentials disappear.
async fn run(settings: Settings) -> Result<(), PollerError> {
    let credentials = Credentials::from_env().map_err(|e| {
        tracing::error!(severity = "CRITICAL", error = %e, "Required credentials missing, stopping");
        e
    })?;

    let api = PracticumClient::new(
        &settings.endpoint,
        &credentials.practicum_token,
        settings.request_timeout(),
    )?;
    let notifier = TelegramNotifier::new(
        &settings.telegram_api_url,
        &credentials.telegram_token,
        &credentials.telegram_chat_id,
        settings.request_timeout(),
    )?;

    let since = settings.window_start(chrono::Utc::now().timestamp());
    tracing::info!(
        endpoint = %settings.endpoint,
        since,
        retry_period_secs = settings.retry_period_secs,
        "Homework Bot starting"
    );

    let mut poller = Poller::new(EnvCredentials, api, notifier, since, settings.retry_period());
    poller.run().await
}
