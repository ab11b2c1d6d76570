//! Tube abstractions.
//!
//! A tube is a named FIFO of JSON payloads. Taking a task leases it: the task
//! stays reserved until it is acked (removed for good) or buried (parked for
//! inspection).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::error_handling::QueueError;
use crate::queue::task::TaskData;

/// A task leased from a tube.
#[async_trait]
pub trait QueuedTask: Send {
    /// The decoded payload.
    fn data(&self) -> &TaskData;

    /// Removes the task from the tube permanently.
    async fn ack(self: Box<Self>) -> Result<(), QueueError>;

    /// Parks the task so that it is never delivered again.
    async fn bury(self: Box<Self>) -> Result<(), QueueError>;
}

/// A named queue of tasks.
#[async_trait]
pub trait Tube: Send + Sync {
    fn name(&self) -> &str;

    /// Waits up to `timeout` for a task.
    ///
    /// `Ok(None)` means nothing arrived in time. Payloads that do not decode
    /// as [`TaskData`] are buried by the tube and also reported as `Ok(None)`.
    async fn take(&self, timeout: Duration) -> Result<Option<Box<dyn QueuedTask>>, QueueError>;

    /// Appends a payload to the tube.
    async fn put(&self, payload: Value) -> Result<(), QueueError>;
}

/// Serializes `value` and puts it on `tube`.
pub async fn put_json<T: Serialize + ?Sized>(tube: &dyn Tube, value: &T) -> Result<(), QueueError> {
    let payload = serde_json::to_value(value)?;
    tube.put(payload).await
}
