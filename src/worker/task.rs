//! Turns a queue task into a resolution and decides where the outcome goes.

use log::info;

use crate::fetch::{RedirectHistory, RedirectResolver};
use crate::queue::{ResultEnvelope, TaskData};

/// Where the outcome of one task must be put.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// Back onto the input tube for one more attempt.
    Resubmit(TaskData),
    /// Onto the output tube as the final verdict.
    Final(ResultEnvelope),
}

impl Routed {
    /// True if the outcome belongs on the input tube.
    pub fn is_resubmission(&self) -> bool {
        matches!(self, Routed::Resubmit(_))
    }
}

/// Routes a resolved chain.
///
/// A chain that ended in a failed fetch is retried once: the task goes back
/// with `recheck` set. A task already marked `recheck` is final whatever its
/// outcome.
pub fn route_history(task: &TaskData, history: RedirectHistory) -> Routed {
    if history.ended_in_error() && !task.recheck {
        Routed::Resubmit(task.clone().into_recheck())
    } else {
        Routed::Final(ResultEnvelope::for_task(task, history))
    }
}

/// Resolves `task.url` and routes the outcome.
pub async fn get_redirect_history_from_task(
    resolver: &dyn RedirectResolver,
    task: &TaskData,
) -> Routed {
    info!("Checking {} (url_id {}, recheck {})", task.url, task.url_id, task.recheck);
    let history = resolver.resolve(&task.url).await;
    route_history(task, history)
}
