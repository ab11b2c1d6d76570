//! Task queue access.
//!
//! This module provides:
//! - Task and result payload types
//! - The [`Tube`] and [`QueuedTask`] traits
//! - A Redis-backed tube for production and an in-memory tube

mod memory;
mod redis_tube;
mod task;
mod tube;

pub use memory::MemoryTube;
pub use redis_tube::RedisTube;
pub use task::{ResultEnvelope, TaskData};
pub use tube::{put_json, QueuedTask, Tube};

use crate::config::Config;
use crate::error_handling::QueueError;

/// Opens tube `name` on the queue server named by `config`.
pub async fn get_tube(config: &Config, name: &str) -> Result<Box<dyn Tube>, QueueError> {
    let tube = RedisTube::connect(
        &config.queue_host,
        config.queue_port,
        &config.queue_space,
        name,
    )
    .await?;
    Ok(Box::new(tube))
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
