//! Worker process.
//!
//! A worker takes one task at a time from the input tube, resolves it and
//! puts the outcome on the output tube (or back on the input tube for a
//! retry). It exits when its parent process disappears.

mod liveness;
mod run;
mod task;

use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::ProcessingStats;
use crate::fetch::{HistoryResolver, HttpFetcher};
use crate::initialization::init_redirect_client;
use crate::queue::get_tube;

// Re-export public API
pub use liveness::{ParentLivenessCheck, ProcfsLiveness};
pub use run::{WorkerContext, WorkerExit};
pub use task::{get_redirect_history_from_task, route_history, Routed};

/// Runs one worker loop against the configured queue until the parent with
/// pid `parent_pid` exits or `cancel` fires.
///
/// # Errors
///
/// Returns an error if the HTTP client or a tube cannot be opened, or if a
/// take or put fails.
pub async fn run_worker(config: &Config, parent_pid: u32, cancel: CancellationToken) -> Result<()> {
    info!("Worker {} started (parent {})", std::process::id(), parent_pid);

    let stats = Arc::new(ProcessingStats::new());
    let client = init_redirect_client(config).context("Failed to initialize HTTP client")?;
    let fetcher = HttpFetcher::new(
        client,
        config.fetch_timeout,
        config.user_agent.clone(),
        Arc::clone(&stats),
    );
    let resolver = HistoryResolver::new(fetcher, config.max_redirects, Arc::clone(&stats));

    let input = get_tube(config, &config.input_tube)
        .await
        .with_context(|| format!("Failed to open input tube {}", config.input_tube))?;
    let output = get_tube(config, &config.output_tube)
        .await
        .with_context(|| format!("Failed to open output tube {}", config.output_tube))?;
    let liveness = ProcfsLiveness::default();

    let context = WorkerContext {
        input: input.as_ref(),
        output: output.as_ref(),
        resolver: &resolver,
        liveness: &liveness,
        parent_pid,
        take_timeout: config.queue_take_timeout,
        stats: &stats,
    };
    let outcome = context.run(&cancel).await;

    info!("Worker {} exiting. Summary:", std::process::id());
    stats.log_summary();

    let exit = outcome.context("Worker loop failed")?;
    info!("Worker {} stopped: {:?}", std::process::id(), exit);
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
