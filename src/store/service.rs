//! Feature layer over the shared store: visit counter, key-value entries,
//! and cookie-backed sessions.
//!
//! This is where key namespacing, session records, and the credential check
//! live. All store access goes through the `StoreClient` capability, so the
//! same code runs against Redis in production and `MemoryStore` in tests.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::{KV_PREFIX, SESSION_PREFIX, VISITS_KEY};
use crate::error::AppError;

use super::StoreClient;

/// Fixed demo accounts. A real deployment would back this with an actual
/// credential store; the demo keeps two hardcoded pairs.
const DEMO_USERS: [(&str, &str); 2] = [("admin", "admin"), ("user", "user")];

/// Result of one visit-counter increment.
#[derive(Debug, Clone, Serialize)]
pub struct VisitCount {
    pub visits: i64,
    /// Which instance served the increment. Purely observational; in a
    /// scaled deployment successive requests land on different instances
    /// while the count keeps climbing.
    pub server: String,
}

/// Session record as stored in the shared store (JSON under `session:{token}`).
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    username: String,
}

/// Client for all externally-shared state.
///
/// Cheap to clone; clones share the underlying store handle.
#[derive(Clone)]
pub struct SharedState {
    store: Arc<dyn StoreClient>,
    instance: String,
    session_ttl: Duration,
}

impl SharedState {
    pub fn new(store: Arc<dyn StoreClient>, instance: String, session_ttl: Duration) -> Self {
        Self {
            store,
            instance,
            session_ttl,
        }
    }

    /// Atomically increment the shared visit counter and return the new
    /// value. Concurrent callers on any instance receive distinct,
    /// consecutive values; the store's atomic increment provides the mutual
    /// exclusion, not this client.
    pub async fn increment_visits(&self) -> Result<VisitCount, AppError> {
        let visits = self.store.increment(VISITS_KEY).await?;
        Ok(VisitCount {
            visits,
            server: self.instance.clone(),
        })
    }

    /// Fetch a key-value entry. An absent key is `NotFound`, which is
    /// distinct from an entry holding an empty string.
    pub async fn get_value(&self, key: &str) -> Result<String, AppError> {
        self.store
            .get(&format!("{KV_PREFIX}{key}"))
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Create or overwrite a key-value entry. Last writer wins.
    pub async fn set_value(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.store.set(&format!("{KV_PREFIX}{key}"), value).await?;
        Ok(())
    }

    /// Validate credentials and create a session, returning the new token.
    ///
    /// Credentials are checked before the store is touched, so a bad login
    /// is 401 even during an outage. The record gets a fixed TTL at creation
    /// and is never refreshed.
    pub async fn create_session(&self, username: &str, password: &str) -> Result<String, AppError> {
        let valid = DEMO_USERS
            .iter()
            .any(|(user, pass)| *user == username && *pass == password);
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = generate_token();
        let record = SessionRecord {
            username: username.to_string(),
        };
        let body = serde_json::to_string(&record)
            .map_err(|e| AppError::Internal(format!("session encoding failed: {e}")))?;

        self.store
            .set_with_expiry(&format!("{SESSION_PREFIX}{token}"), &body, self.session_ttl)
            .await?;

        tracing::info!(username, "session created");
        Ok(token)
    }

    /// Resolve a session token to its username. Missing, expired, and
    /// unknown tokens are all `Unauthenticated`; a corrupt record is treated
    /// the same way rather than surfaced. Does not refresh the TTL.
    pub async fn resolve_session(&self, token: &str) -> Result<String, AppError> {
        let body = self
            .store
            .get(&format!("{SESSION_PREFIX}{token}"))
            .await?
            .ok_or(AppError::Unauthenticated)?;

        let record: SessionRecord =
            serde_json::from_str(&body).map_err(|_| AppError::Unauthenticated)?;
        Ok(record.username)
    }

    /// Delete a session. Idempotent; deleting an absent token succeeds.
    pub async fn destroy_session(&self, token: &str) -> Result<(), AppError> {
        self.store.delete(&format!("{SESSION_PREFIX}{token}")).await?;
        Ok(())
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }
}

/// 128 bits from the OS entropy source, hex-encoded (32 characters).
fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
