//! Redis backend for the shared store.
//!
//! The connection is established lazily on first use, so an unreachable store
//! at startup never prevents the service from coming up; store-dependent
//! endpoints simply degrade until it becomes reachable. Every operation,
//! including connection establishment, is bounded by `STORE_TIMEOUT_SECS` and
//! converts timeouts and transport errors alike into `StoreError::Unavailable`.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisResult};
use tokio::time::timeout;

use crate::config::{StoreConfig, STORE_TIMEOUT_SECS};

use super::{StoreClient, StoreError};

pub struct RedisStore {
    client: redis::Client,
    /// Lazily-established connection, shared across callers. The manager
    /// reconnects on its own after transient failures; a `None` here only
    /// means no connection attempt has succeeded yet.
    manager: Mutex<Option<ConnectionManager>>,
    op_timeout: Duration,
}

impl RedisStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client =
            redis::Client::open(info).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            manager: Mutex::new(None),
            op_timeout: Duration::from_secs(STORE_TIMEOUT_SECS),
        })
    }

    /// Get the shared connection, establishing it if this is the first
    /// successful attempt. Failure leaves the slot empty so the next call
    /// retries from scratch.
    ///
    /// The connect attempt runs outside the lock. Concurrent callers during
    /// an outage each fail within their own timeout instead of queueing
    /// behind one another; on recovery the first finished attempt fills the
    /// slot and later winners are dropped.
    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if let Some(manager) = self.manager.lock().unwrap().clone() {
            return Ok(manager);
        }

        let manager = bounded(self.op_timeout, self.client.get_connection_manager()).await?;

        let mut slot = self.manager.lock().unwrap();
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }
        tracing::info!("connected to store");
        *slot = Some(manager.clone());
        Ok(manager)
    }
}

/// Run one store operation under the timeout, folding timeout and transport
/// errors into the single `Unavailable` condition.
async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = RedisResult<T>>,
{
    match timeout(limit, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
        Err(_) => Err(StoreError::Unavailable(format!(
            "operation timed out after {limit:?}"
        ))),
    }
}

#[async_trait]
impl StoreClient for RedisStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.incr(key, 1)).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.get(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.set(key, value)).await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        bounded(self.op_timeout, conn.set_ex(key, value, ttl.as_secs())).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _removed: i64 = bounded(self.op_timeout, conn.del(key)).await?;
        Ok(())
    }
}
