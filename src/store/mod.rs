//! Shared-state store: one external key-value store shared by all instances.
//!
//! The seam is the `StoreClient` trait, a small capability interface over raw
//! key-value operations. The real backend (`RedisStore`) talks to Redis with
//! bounded timeouts; tests swap in `MemoryStore`, which implements the same
//! trait in-process. `SharedState` layers the actual features (visit counter,
//! key-value entries, sessions) on top of whichever backend it is given.

mod memory;
mod redis;
mod service;

pub use memory::MemoryStore;
pub use redis::RedisStore;
pub use service::{SharedState, VisitCount};

use std::time::Duration;

use async_trait::async_trait;

/// The single failure mode for store access.
///
/// Connection refusals, resets, protocol errors, and timeouts all collapse
/// into `Unavailable` so callers have exactly one condition to handle. The
/// wrapped message is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unavailable(String),
}

/// Raw key-value operations against the shared store.
///
/// Atomicity of `increment` is the backend's responsibility (Redis `INCR`);
/// this layer performs no client-side locking. Everything else is
/// last-writer-wins. No operation may block past the backend's timeout.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Atomically increment the integer at `key` (creating it at 0 first)
    /// and return the new value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Fetch the value at `key`; `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` at `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` at `key` with an expiry. The TTL is fixed at write time
    /// and not refreshed by reads.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
