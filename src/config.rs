//! Configuration loading and constants.
//!
//! All configuration is derived from environment variables, matching how the
//! surrounding platform injects it (ConfigMap and Secret values as plain env
//! vars, pod metadata via the Downward API). Missing or malformed values fall
//! back to defaults rather than aborting startup; a broken ConfigMap must not
//! keep the demo from coming up.

use serde::Serialize;

// =============================================================================
// Shared store key layout
// =============================================================================
// All instances share one external store. The counter lives under a single
// fixed key; key-value entries and sessions each get their own namespace so
// user-supplied keys can never collide with session tokens.

/// Fixed key holding the shared visit counter
pub const VISITS_KEY: &str = "visits";

/// Namespace prefix for arbitrary key-value entries
pub const KV_PREFIX: &str = "kv:";

/// Namespace prefix for session records (keyed by session token)
pub const SESSION_PREFIX: &str = "session:";

// =============================================================================
// Timeouts and lifecycles
// =============================================================================

/// Per-operation timeout for store calls, including connection establishment.
/// Short enough that a dead store is detected within a few seconds.
pub const STORE_TIMEOUT_SECS: u64 = 2;

/// Drain window for graceful shutdown after SIGTERM/Ctrl+C. Must stay below
/// the platform's termination grace period or in-flight requests get killed.
pub const SHUTDOWN_GRACE_SECS: u64 = 30;

/// Default session lifetime (one hour), overridable via SESSION_TTL
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Default upper bound for /stress burn duration, overridable via MAX_STRESS_SECONDS
pub const DEFAULT_MAX_STRESS_SECS: u64 = 30;

// =============================================================================
// Defaults and strings
// =============================================================================

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session_id";

/// Default log filter when neither --log-level nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "kubeling=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

const DEFAULT_APP_NAME: &str = "kubeling";
const DEFAULT_INSTANCE: &str = "unknown";
const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
const DEFAULT_HTTP_PORT: u16 = 8000;
const DEFAULT_STORE_HOST: &str = "localhost";
const DEFAULT_STORE_PORT: u16 = 6379;

/// Root application configuration, assembled from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application name shown in greetings (APP_NAME)
    pub app_name: String,
    /// Instance identity (POD_NAME, falling back to HOSTNAME); stamped into
    /// responses for observability, never used for addressing
    pub instance: String,
    /// HTTP listen configuration
    pub http: HttpConfig,
    /// External store connection settings
    pub store: StoreConfig,
    /// Session lifetime in seconds (SESSION_TTL)
    pub session_ttl_seconds: u64,
    /// Upper bound for /stress burn duration (MAX_STRESS_SECONDS)
    pub max_stress_seconds: u64,
    /// Log format: "text" (human-readable, default) or "json" (LOG_FORMAT)
    pub log_format: String,
    /// Pod metadata injected via Downward API env vars
    pub pod: PodInfo,
}

/// HTTP server listen address
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the external key-value store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    /// Optional credential (REDIS_PASSWORD). Absence never blocks startup;
    /// it only means store-dependent endpoints degrade until reachable.
    pub password: Option<String>,
}

/// Pod metadata from Downward API env vars, returned verbatim by /info.
#[derive(Debug, Clone, Serialize)]
pub struct PodInfo {
    pub pod_name: String,
    pub pod_ip: String,
    pub node_name: String,
    pub namespace: String,
    pub cpu_request: String,
    pub cpu_limit: String,
    pub memory_request: String,
    pub memory_limit: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Tests pass a closure over a fixed map so they never depend on (or
    /// mutate) the real process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let instance = lookup("POD_NAME")
            .or_else(|| lookup("HOSTNAME"))
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());

        let pod = PodInfo {
            pod_name: instance.clone(),
            pod_ip: lookup("POD_IP").unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
            node_name: lookup("NODE_NAME").unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
            namespace: lookup("POD_NAMESPACE").unwrap_or_else(|| DEFAULT_INSTANCE.to_string()),
            cpu_request: lookup("CPU_REQUEST").unwrap_or_else(|| "not set".to_string()),
            cpu_limit: lookup("CPU_LIMIT").unwrap_or_else(|| "not set".to_string()),
            memory_request: lookup("MEMORY_REQUEST").unwrap_or_else(|| "not set".to_string()),
            memory_limit: lookup("MEMORY_LIMIT").unwrap_or_else(|| "not set".to_string()),
        };

        Self {
            app_name: lookup("APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            instance,
            http: HttpConfig {
                host: lookup("HTTP_HOST").unwrap_or_else(|| DEFAULT_HTTP_HOST.to_string()),
                port: lookup("HTTP_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_HTTP_PORT),
            },
            store: StoreConfig {
                host: lookup("REDIS_HOST").unwrap_or_else(|| DEFAULT_STORE_HOST.to_string()),
                port: lookup("REDIS_PORT")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_STORE_PORT),
                password: lookup("REDIS_PASSWORD"),
            },
            // A zero TTL is rejected by the store's expiring-set command, so
            // it gets the same fallback treatment as a malformed value.
            session_ttl_seconds: lookup("SESSION_TTL")
                .and_then(|v| v.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_SECS),
            max_stress_seconds: lookup("MAX_STRESS_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_STRESS_SECS),
            log_format: lookup("LOG_FORMAT").unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string()),
            pod,
        }
    }

    /// Application version, baked in at compile time.
    pub fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
