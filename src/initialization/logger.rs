//! Logger initialization.
//!
//! Supervisor and workers write to the same stderr, so every line carries the
//! pid of the process that wrote it.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Dependency modules that are clamped regardless of the requested level.
const NOISY_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("redis", LevelFilter::Info),
];

/// Renders one structured log line.
fn json_line(ts_millis: i64, pid: u32, level: log::Level, target: &str, msg: &str) -> String {
    format!(
        "{{\"ts\":{},\"pid\":{},\"level\":\"{}\",\"target\":{},\"msg\":{}}}",
        ts_millis,
        pid,
        level,
        serde_json::to_string(target).unwrap_or_else(|_| "\"\"".into()),
        serde_json::to_string(msg).unwrap_or_else(|_| "\"\"".into())
    )
}

/// Initializes the logger with the specified level and format.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate, so
/// `RUST_LOG=redis=debug` still works for a single dependency.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for (module, ceiling) in NOISY_MODULES {
        builder.filter_module(module, (*ceiling).min(level));
    }
    builder.filter_module("redirect_checker", level);

    let pid = std::process::id();
    match format {
        LogFormat::Json => {
            builder.format(move |buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        pid,
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(move |buf, record| {
                let level = record.level();
                let colored_level = match level {
                    log::Level::Error => level.to_string().red(),
                    log::Level::Warn => level.to_string().yellow(),
                    log::Level::Info => level.to_string().green(),
                    log::Level::Debug => level.to_string().blue(),
                    log::Level::Trace => level.to_string().purple(),
                };

                writeln!(
                    buf,
                    "{} {} {} [{}] {}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    pid.to_string().dimmed(),
                    record.target().cyan(),
                    colored_level,
                    record.args()
                )
            });
        }
    }

    // try_init so that a second call (tests, `check` after `worker`) is an error, not a panic
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}
