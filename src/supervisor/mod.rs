//! Process-pool supervisor.
//!
//! Every iteration probes the network. While it is reachable the pool is kept
//! at its configured size; as soon as it is not, every worker is terminated.
//! The supervisor then sleeps for the configured interval and starts over.

mod network;
mod pool;

use anyhow::{Context, Result};
use log::info;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::initialization::init_probe_client;
use crate::utils::create_pidfile;

// Re-export public API
pub use network::{check_network_status, HttpNetworkProbe, NetworkProbe};
pub use pool::{spawn_workers, ProcessSpawner, WorkerHandle, WorkerPool, WorkerSpawner};

/// What one supervisor iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationReport {
    pub reachable: bool,
    /// Workers found to have exited since the previous iteration.
    pub reaped: usize,
    pub spawned: usize,
    pub terminated: usize,
}

/// Drives a [`WorkerPool`] from a [`NetworkProbe`].
pub struct Supervisor {
    probe: Box<dyn NetworkProbe>,
    pool: WorkerPool,
    sleep: Duration,
    pid: u32,
}

impl Supervisor {
    /// `pid` is handed to every worker for its parent liveness check.
    pub fn new(probe: Box<dyn NetworkProbe>, pool: WorkerPool, sleep: Duration, pid: u32) -> Self {
        Supervisor {
            probe,
            pool,
            sleep,
            pid,
        }
    }

    /// Tracked workers.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Runs one iteration without sleeping.
    pub async fn tick(&mut self) -> IterationReport {
        let reaped = self.pool.reap();
        let reachable = self.probe.is_reachable().await;
        let (spawned, terminated) = if reachable {
            (self.pool.fill(self.pid), 0)
        } else {
            (0, self.pool.terminate_all())
        };
        IterationReport {
            reachable,
            reaped,
            spawned,
            terminated,
        }
    }

    /// Iterates until `cancel` fires, then terminates every worker.
    ///
    /// Returns the number of iterations run.
    pub async fn run(&mut self, cancel: &CancellationToken) -> usize {
        let mut iterations = 0;
        while !cancel.is_cancelled() {
            let report = self.tick().await;
            iterations += 1;
            info!(
                "Network {}: {} worker(s) running ({} reaped, {} spawned, {} terminated)",
                if report.reachable { "up" } else { "down" },
                self.pool.len(),
                report.reaped,
                report.spawned,
                report.terminated
            );

            tokio::select! {
                _ = tokio::time::sleep(self.sleep) => {}
                _ = cancel.cancelled() => break,
            }
        }

        let terminated = self.pool.terminate_all();
        info!("Supervisor stopping, terminated {} worker(s)", terminated);
        iterations
    }
}

/// Runs the supervisor for `config` until `cancel` fires.
///
/// Writes the pidfile first when one is configured.
///
/// # Errors
///
/// Returns an error if the pidfile, the probe client or the worker spawner
/// cannot be set up.
pub async fn run_supervisor(config: &Config, cancel: CancellationToken) -> Result<()> {
    if let Some(path) = &config.pidfile {
        create_pidfile(path).with_context(|| format!("Failed to write pidfile {}", path.display()))?;
    }

    let pid = std::process::id();
    info!(
        "Supervisor {} started: pool size {}, checking {} every {:?}",
        pid, config.worker_pool_size, config.check_url, config.sleep
    );

    let client = init_probe_client(config).context("Failed to initialize probe client")?;
    let probe = HttpNetworkProbe::new(client, config.check_url.clone(), config.http_timeout);
    let spawner = ProcessSpawner::for_current_exe(config).context("Cannot locate own executable")?;
    let pool = WorkerPool::new(Box::new(spawner), config.worker_pool_size);

    let mut supervisor = Supervisor::new(Box::new(probe), pool, config.sleep, pid);
    supervisor.run(&cancel).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
