//! In-process tubes.
//!
//! Used by the `check` command and by tests. Every lease outcome is recorded
//! so callers can inspect what happened to each task.

use async_trait::async_trait;
use log::error;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;

use crate::error_handling::QueueError;
use crate::queue::task::TaskData;
use crate::queue::tube::{QueuedTask, Tube};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct MemoryInner {
    name: String,
    ready: Mutex<VecDeque<Value>>,
    arrived: Notify,
    taken: AtomicUsize,
    acked: Mutex<Vec<TaskData>>,
    buried: Mutex<Vec<Value>>,
    closed: AtomicBool,
}

impl MemoryInner {
    fn check_open(&self) -> Result<(), QueueError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(QueueError::Rejected(format!("tube {} is closed", self.name)))
        } else {
            Ok(())
        }
    }
}

/// A tube held in memory. Clones share the same queue.
#[derive(Clone)]
pub struct MemoryTube {
    inner: Arc<MemoryInner>,
}

impl MemoryTube {
    pub fn new(name: &str) -> Self {
        MemoryTube {
            inner: Arc::new(MemoryInner {
                name: name.to_string(),
                ready: Mutex::new(VecDeque::new()),
                arrived: Notify::new(),
                taken: AtomicUsize::new(0),
                acked: Mutex::new(Vec::new()),
                buried: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Payloads waiting to be taken, oldest first.
    pub fn pending(&self) -> Vec<Value> {
        lock(&self.inner.ready).iter().cloned().collect()
    }

    /// Number of successful takes so far.
    pub fn taken_count(&self) -> usize {
        self.inner.taken.load(Ordering::SeqCst)
    }

    /// Tasks acked so far, in ack order.
    pub fn acked(&self) -> Vec<TaskData> {
        lock(&self.inner.acked).clone()
    }

    /// Payloads buried so far.
    pub fn buried(&self) -> Vec<Value> {
        lock(&self.inner.buried).clone()
    }

    /// Makes every later put, ack and bury fail. Takes still drain the queue.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Tube for MemoryTube {
    fn name(&self) -> &str {
        &self.inner.name
    }

    async fn take(&self, timeout: Duration) -> Result<Option<Box<dyn QueuedTask>>, QueueError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let next = lock(&self.inner.ready).pop_front();
            if let Some(payload) = next {
                self.inner.taken.fetch_add(1, Ordering::SeqCst);
                return match serde_json::from_value::<TaskData>(payload.clone()) {
                    Ok(data) => Ok(Some(Box::new(MemoryTask {
                        data,
                        payload,
                        tube: Arc::clone(&self.inner),
                    }))),
                    Err(e) => {
                        error!("Undecodable payload on {}: {}. Burying it", self.inner.name, e);
                        lock(&self.inner.buried).push(payload);
                        Ok(None)
                    }
                };
            }
            // `notify_one` leaves a permit behind, so a put racing this wait is not lost.
            if tokio::time::timeout_at(deadline, self.inner.arrived.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    async fn put(&self, payload: Value) -> Result<(), QueueError> {
        self.inner.check_open()?;
        lock(&self.inner.ready).push_back(payload);
        self.inner.arrived.notify_one();
        Ok(())
    }
}

struct MemoryTask {
    data: TaskData,
    payload: Value,
    tube: Arc<MemoryInner>,
}

#[async_trait]
impl QueuedTask for MemoryTask {
    fn data(&self) -> &TaskData {
        &self.data
    }

    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        let MemoryTask { data, tube, .. } = *self;
        tube.check_open()?;
        lock(&tube.acked).push(data);
        Ok(())
    }

    async fn bury(self: Box<Self>) -> Result<(), QueueError> {
        let MemoryTask { payload, tube, .. } = *self;
        tube.check_open()?;
        lock(&tube.buried).push(payload);
        Ok(())
    }
}
