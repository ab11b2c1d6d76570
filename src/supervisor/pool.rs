//! Worker process pool.
//!
//! Workers are separate OS processes running this same binary with the
//! `worker` subcommand. The pool keeps at most `size` of them alive.

use log::{debug, error, info};
use std::path::PathBuf;
use std::process::Stdio;

use crate::config::Config;

/// A running (or recently exited) worker.
pub trait WorkerHandle: Send {
    /// OS process id, if the process has not been reaped yet.
    fn id(&self) -> Option<u32>;

    /// Polls the process without blocking.
    fn is_running(&mut self) -> bool;

    /// Asks the process to stop. Does not wait for it.
    fn terminate(&mut self);
}

/// Starts worker processes.
pub trait WorkerSpawner: Send + Sync {
    fn spawn(&self, parent_pid: u32) -> std::io::Result<Box<dyn WorkerHandle>>;
}

/// Spawns workers by re-executing a binary with the `worker` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpawner {
    exe: PathBuf,
    args: Vec<String>,
}

impl ProcessSpawner {
    /// `args` are passed before `worker --parent-pid <pid>`.
    pub fn new(exe: impl Into<PathBuf>, args: Vec<String>) -> Self {
        ProcessSpawner {
            exe: exe.into(),
            args,
        }
    }

    /// Spawner for the running executable, forwarding `config`.
    pub fn for_current_exe(config: &Config) -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, config.worker_args()))
    }
}

impl WorkerSpawner for ProcessSpawner {
    fn spawn(&self, parent_pid: u32) -> std::io::Result<Box<dyn WorkerHandle>> {
        let child = tokio::process::Command::new(&self.exe)
            .args(&self.args)
            .arg("worker")
            .arg("--parent-pid")
            .arg(parent_pid.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;
        Ok(Box::new(ChildWorker { child }))
    }
}

struct ChildWorker {
    child: tokio::process::Child,
}

impl WorkerHandle for ChildWorker {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!("Worker exited: {}", status);
                false
            }
            Err(e) => {
                error!("Cannot poll worker {:?}: {}", self.child.id(), e);
                false
            }
        }
    }

    fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("Worker {:?} already gone: {}", self.child.id(), e);
        }
    }
}

/// Starts `n` workers, each told to watch `parent_pid`.
///
/// Spawn failures are logged and skipped; the returned handles are the
/// workers that did start.
pub fn spawn_workers(
    spawner: &dyn WorkerSpawner,
    n: usize,
    parent_pid: u32,
) -> Vec<Box<dyn WorkerHandle>> {
    (0..n)
        .filter_map(|_| match spawner.spawn(parent_pid) {
            Ok(handle) => {
                debug!("Spawned worker {:?}", handle.id());
                Some(handle)
            }
            Err(e) => {
                error!("Failed to spawn worker: {}", e);
                None
            }
        })
        .collect()
}

/// The tracked set of workers.
pub struct WorkerPool {
    spawner: Box<dyn WorkerSpawner>,
    workers: Vec<Box<dyn WorkerHandle>>,
    size: usize,
}

impl WorkerPool {
    pub fn new(spawner: Box<dyn WorkerSpawner>, size: usize) -> Self {
        WorkerPool {
            spawner,
            workers: Vec::new(),
            size,
        }
    }

    /// Number of tracked workers. Call [`WorkerPool::reap`] first for an
    /// accurate count.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Drops workers that have exited. Returns how many were dropped.
    pub fn reap(&mut self) -> usize {
        let before = self.workers.len();
        self.workers.retain_mut(|worker| worker.is_running());
        before - self.workers.len()
    }

    /// Spawns workers until `size` are tracked. Returns how many started.
    pub fn fill(&mut self, parent_pid: u32) -> usize {
        let missing = self.size.saturating_sub(self.workers.len());
        if missing == 0 {
            return 0;
        }
        let spawned = spawn_workers(self.spawner.as_ref(), missing, parent_pid);
        let count = spawned.len();
        self.workers.extend(spawned);
        count
    }

    /// Terminates and forgets every tracked worker. Returns how many there were.
    pub fn terminate_all(&mut self) -> usize {
        let count = self.workers.len();
        for mut worker in self.workers.drain(..) {
            info!("Terminating worker {:?}", worker.id());
            worker.terminate();
        }
        count
    }
}
