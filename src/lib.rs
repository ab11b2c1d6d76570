//! redirect_checker library: queue-driven redirect chain resolution
//!
//! This library resolves the full redirect chain of a URL (HTTP redirects,
//! `<meta http-equiv="refresh">` redirects and `market://` deep links) and
//! reports which tracking counters appear on the last page reached. URLs
//! arrive as tasks on a work queue and are processed by a supervised pool of
//! worker processes.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use redirect_checker::fetch::{get_redirect_history, HttpFetcher};
//! use redirect_checker::initialization::init_redirect_client;
//! use redirect_checker::{Config, ProcessingStats};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let stats = Arc::new(ProcessingStats::new());
//! let fetcher = HttpFetcher::new(
//!     init_redirect_client(&config)?,
//!     config.fetch_timeout,
//!     None,
//!     Arc::clone(&stats),
//! );
//!
//! let history = get_redirect_history(&fetcher, "http://example.com/", 30, Some(&stats)).await;
//! println!("{}", serde_json::to_string(&history)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The queue backend is Redis.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod parse;
pub mod queue;
pub mod supervisor;
pub mod urls;
mod utils;
pub mod worker;

// Re-export public API
pub use app::check_urls;
pub use config::{Command, Config, LogFormat, LogLevel, Opt};
pub use error_handling::{ProcessingStats, QueueError};
pub use fetch::{get_redirect_history, HopKind, RedirectHistory};
pub use supervisor::run_supervisor;
pub use worker::run_worker;
