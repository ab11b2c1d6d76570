//! The worker loop.

use log::{debug, error, info};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, QueueError};
use crate::fetch::RedirectResolver;
use crate::queue::{put_json, QueuedTask, Tube};
use crate::worker::liveness::ParentLivenessCheck;
use crate::worker::task::{get_redirect_history_from_task, Routed};

/// Why a worker loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// The parent process no longer exists.
    ParentGone,
    /// Shutdown was requested.
    Cancelled,
}

/// Everything one worker loop runs against.
pub struct WorkerContext<'a> {
    pub input: &'a dyn Tube,
    pub output: &'a dyn Tube,
    pub resolver: &'a dyn RedirectResolver,
    pub liveness: &'a dyn ParentLivenessCheck,
    pub parent_pid: u32,
    pub take_timeout: Duration,
    pub stats: &'a ProcessingStats,
}

impl WorkerContext<'_> {
    /// Takes and processes tasks until the parent dies or `cancel` fires.
    ///
    /// Parent liveness is checked once per iteration; a task in progress is
    /// always finished. Cancellation is only observed between iterations, so
    /// shutdown waits at most one `take_timeout` plus the task in hand.
    ///
    /// # Errors
    ///
    /// A failed take or put ends the loop with the queue error. Ack failures
    /// are logged and counted but never end the loop.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<WorkerExit, QueueError> {
        while self.liveness.is_alive(self.parent_pid) {
            if cancel.is_cancelled() {
                return Ok(WorkerExit::Cancelled);
            }

            // A take is never dropped mid-flight: the backend may already have
            // leased the payload, so it runs to its bounded timeout.
            let Some(task) = self.input.take(self.take_timeout).await? else {
                continue;
            };
            self.process(task).await?;
        }

        info!("Parent process {} is gone", self.parent_pid);
        Ok(WorkerExit::ParentGone)
    }

    /// Resolves one leased task, puts the outcome, then acks the lease.
    async fn process(&self, task: Box<dyn QueuedTask>) -> Result<(), QueueError> {
        debug!("Took task url_id {} from {}", task.data().url_id, self.input.name());

        match get_redirect_history_from_task(self.resolver, task.data()).await {
            Routed::Resubmit(data) => {
                info!("Resubmitting url_id {} to {}", data.url_id, self.input.name());
                put_json(self.input, &data).await?;
                self.stats.increment_info(InfoType::TaskResubmitted);
            }
            Routed::Final(envelope) => {
                info!("Putting result for url_id {} to {}", envelope.url_id, self.output.name());
                put_json(self.output, &envelope).await?;
                self.stats.increment_info(InfoType::TaskResolved);
            }
        }

        let url_id = task.data().url_id.clone();
        if let Err(e) = task.ack().await {
            error!("Failed to ack task url_id {}: {}", url_id, e);
            self.stats.increment_error(ErrorType::QueueAck);
        }
        Ok(())
    }
}
