//! Redis-backed tubes.
//!
//! Each tube `name` in space `space` uses three lists:
//! - `space:name` holds ready payloads (pushed left, taken right)
//! - `space:name:taken` holds leased payloads until they are acked
//! - `space:name:buried` holds payloads parked by `bury`
//!
//! `BRPOPLPUSH` moves a payload atomically from ready to taken, so a worker
//! that dies mid-task leaves its lease visible in the taken list.

use async_trait::async_trait;
use log::{debug, error};
use redis::aio::MultiplexedConnection;
use redis::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error_handling::QueueError;
use crate::queue::task::TaskData;
use crate::queue::tube::{QueuedTask, Tube};

/// Key names of one tube.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TubeKeys {
    ready: String,
    taken: String,
    buried: String,
}

impl TubeKeys {
    fn new(space: &str, name: &str) -> Self {
        let ready = format!("{}:{}", space, name);
        TubeKeys {
            taken: format!("{}:taken", ready),
            buried: format!("{}:buried", ready),
            ready,
        }
    }
}

/// Moves one copy of `raw` from the taken list to the buried list.
async fn bury_raw(
    conn: &mut MultiplexedConnection,
    keys: &TubeKeys,
    raw: &str,
) -> Result<(), QueueError> {
    redis::pipe()
        .atomic()
        .cmd("LREM")
        .arg(&keys.taken)
        .arg(1)
        .arg(raw)
        .ignore()
        .cmd("LPUSH")
        .arg(&keys.buried)
        .arg(raw)
        .ignore()
        .query_async::<_, ()>(conn)
        .await?;
    Ok(())
}

/// A tube stored in Redis lists.
pub struct RedisTube {
    name: String,
    keys: TubeKeys,
    conn: MultiplexedConnection,
}

impl RedisTube {
    /// Connects to the Redis server at `host:port` and opens tube `name` in
    /// `space`.
    pub async fn connect(host: &str, port: u16, space: &str, name: &str) -> Result<Self, QueueError> {
        let client = Client::open(format!("redis://{}:{}/", host, port))?;
        let conn = client.get_multiplexed_async_connection().await?;
        debug!("Connected to queue at {}:{} for tube {}:{}", host, port, space, name);
        Ok(RedisTube {
            name: name.to_string(),
            keys: TubeKeys::new(space, name),
            conn,
        })
    }
}

#[async_trait]
impl Tube for RedisTube {
    fn name(&self) -> &str {
        &self.name
    }

    async fn take(&self, timeout: Duration) -> Result<Option<Box<dyn QueuedTask>>, QueueError> {
        let mut conn = self.conn.clone();
        // BRPOPLPUSH takes whole seconds; 0 would block forever.
        let seconds = timeout.as_secs().max(1);
        let raw: Option<String> = redis::cmd("BRPOPLPUSH")
            .arg(&self.keys.ready)
            .arg(&self.keys.taken)
            .arg(seconds)
            .query_async(&mut conn)
            .await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<TaskData>(&raw) {
            Ok(data) => {
                debug!("Took task {} from {}", data.url_id, self.keys.ready);
                Ok(Some(Box::new(RedisTask {
                    data,
                    raw,
                    keys: self.keys.clone(),
                    conn,
                })))
            }
            Err(e) => {
                error!(
                    "Undecodable payload on {}: {}. Burying it: {}",
                    self.keys.ready, e, raw
                );
                bury_raw(&mut conn, &self.keys, &raw).await?;
                Ok(None)
            }
        }
    }

    async fn put(&self, payload: Value) -> Result<(), QueueError> {
        let raw = serde_json::to_string(&payload)?;
        let mut conn = self.conn.clone();
        redis::cmd("LPUSH")
            .arg(&self.keys.ready)
            .arg(&raw)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }
}

/// A task leased through `BRPOPLPUSH`.
struct RedisTask {
    data: TaskData,
    /// Exact bytes taken, used to find the lease again.
    raw: String,
    keys: TubeKeys,
    conn: MultiplexedConnection,
}

#[async_trait]
impl QueuedTask for RedisTask {
    fn data(&self) -> &TaskData {
        &self.data
    }

    async fn ack(self: Box<Self>) -> Result<(), QueueError> {
        let mut conn = self.conn;
        let removed: i64 = redis::cmd("LREM")
            .arg(&self.keys.taken)
            .arg(1)
            .arg(&self.raw)
            .query_async(&mut conn)
            .await?;
        if removed == 0 {
            return Err(QueueError::Rejected(format!(
                "lease for task {} is gone from {}",
                self.data.url_id, self.keys.taken
            )));
        }
        Ok(())
    }

    async fn bury(self: Box<Self>) -> Result<(), QueueError> {
        let mut conn = self.conn;
        bury_raw(&mut conn, &self.keys, &self.raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tube_keys() {
        let keys = TubeKeys::new("redirect_checker", "url_check_input");
        assert_eq!(keys.ready, "redirect_checker:url_check_input");
        assert_eq!(keys.taken, "redirect_checker:url_check_input:taken");
        assert_eq!(keys.buried, "redirect_checker:url_check_input:buried");
    }

    /// Requires a Redis server on 127.0.0.1:6379.
    #[tokio::test]
    #[ignore]
    async fn test_redis_tube_put_take_ack() {
        let space = format!("redirect_checker_test_{}", std::process::id());
        let tube = RedisTube::connect("127.0.0.1", 6379, &space, "input")
            .await
            .expect("Redis must be running for this test");

        tube.put(serde_json::json!({"url": "http://example.com/", "url_id": 7}))
            .await
            .expect("put");
        let task = tube
            .take(Duration::from_secs(1))
            .await
            .expect("take")
            .expect("a task");
        assert_eq!(task.data().url, "http://example.com/");
        task.ack().await.expect("ack");

        assert!(tube
            .take(Duration::from_secs(1))
            .await
            .expect("take")
            .is_none());
    }
}
