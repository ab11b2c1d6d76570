//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `redirect_checker` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization
//! - Signal handling and subcommand dispatch
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use redirect_checker::app::cancel_on_signal;
use redirect_checker::initialization::init_logger_with;
use redirect_checker::{check_urls, run_supervisor, run_worker, Command, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env from the working directory, falling back to the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(opt.config);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;
    config.validate().context("Invalid configuration")?;

    let cancel = CancellationToken::new();
    let signals = cancel_on_signal(cancel.clone());

    let outcome = match opt.command {
        Command::Supervise => run_supervisor(&config, cancel.clone()).await,
        Command::Worker { parent_pid } => run_worker(&config, parent_pid, cancel.clone()).await,
        Command::Check { urls } => check_urls(&config, &urls).await,
    };

    cancel.cancel();
    let _ = signals.await;

    if let Err(e) = outcome {
        eprintln!("redirect_checker error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
