//! In-memory store backend for tests.
//!
//! Implements the same `StoreClient` trait as the Redis backend so the
//! feature layer is exercised for real without a running store. Supports the
//! two failure-injection knobs tests need: an availability switch (simulating
//! an outage) and a movable clock (simulating TTL expiry without sleeping).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{StoreClient, StoreError};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

struct Inner {
    entries: Mutex<HashMap<String, Entry>>,
    /// Virtual time offset added to `Instant::now()`; `advance` moves it
    /// forward so TTL expiry can be observed deterministically.
    clock_skew: Mutex<Duration>,
    available: AtomicBool,
}

/// Shared in-memory store. Clones share the same data, so two logical
/// "instances" in a test can point at one store the way two pods share one
/// Redis.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                clock_skew: Mutex::new(Duration::ZERO),
                available: AtomicBool::new(true),
            }),
        }
    }

    /// Simulate an outage (`false`) or recovery (`true`). While unavailable,
    /// every operation returns `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::Relaxed);
    }

    /// Move the store's clock forward, expiring any entries whose TTL has
    /// elapsed by the new time.
    pub fn advance(&self, by: Duration) {
        let mut skew = self.inner.clock_skew.lock().unwrap();
        *skew += by;
    }

    fn now(&self) -> Instant {
        Instant::now() + *self.inner.clock_skew.lock().unwrap()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.inner.available.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is down".into()))
        }
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = self.now();
        let mut entries = self.inner.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.expires_at.is_some_and(|at| now >= at) => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreClient for MemoryStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        self.check_available()?;
        let now = self.now();
        // Read-modify-write under one lock; this backend provides the same
        // atomicity the real store's INCR does.
        let mut entries = self.inner.entries.lock().unwrap();
        let current = match entries.get(key) {
            Some(entry) if entry.expires_at.is_some_and(|at| now >= at) => 0,
            // Redis rejects INCR on a non-integer value; its error would
            // reach callers as the collapsed unavailable condition.
            Some(entry) => entry
                .value
                .parse::<i64>()
                .map_err(|_| StoreError::Unavailable("value is not an integer".into()))?,
            None => 0,
        };
        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: None,
            },
        );
        Ok(next)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        Ok(self.live_value(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let expires_at = Some(self.now() + ttl);
        self.inner.entries.lock().unwrap().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_available()?;
        self.inner.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
