//! Task and result payloads carried by the tubes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::CHECK_TYPE_NORMAL;
use crate::fetch::RedirectHistory;

/// A unit of work taken from the input tube.
///
/// Fields the worker does not interpret are kept in `extra` and written back
/// unchanged when the task is resubmitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    pub url: String,
    /// Opaque correlation identifier, echoed into the result.
    pub url_id: Value,
    /// Set on a task that should be resolved now instead of being sent back
    /// to the input tube.
    #[serde(default)]
    pub recheck: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicious: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskData {
    pub fn new(url: impl Into<String>, url_id: impl Into<Value>) -> Self {
        TaskData {
            url: url.into(),
            url_id: url_id.into(),
            recheck: false,
            suspicious: None,
            extra: Map::new(),
        }
    }

    /// Copy of this task marked for immediate resolution.
    pub fn into_recheck(mut self) -> Self {
        self.recheck = true;
        self
    }
}

/// A resolved chain, written to the output tube.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub url_id: Value,
    pub result: RedirectHistory,
    pub check_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspicious: Option<Value>,
}

impl ResultEnvelope {
    /// Builds the envelope for `task`, carrying over its `suspicious` marker.
    pub fn for_task(task: &TaskData, result: RedirectHistory) -> Self {
        ResultEnvelope {
            url_id: task.url_id.clone(),
            result,
            check_type: CHECK_TYPE_NORMAL.to_string(),
            suspicious: task.suspicious.clone(),
        }
    }
}
