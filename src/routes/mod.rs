//! HTTP route handlers.
//!
//! Handlers are grouped by concern: probes and readiness toggles, the shared
//! visit counter, the key-value store, cookie-backed auth, and static
//! metadata. Every response carries `Cache-Control: no-store`; probe results
//! and shared state must never be served stale by an intermediary.
//!
//! Request tracing is enabled via middleware that generates a unique request
//! ID per incoming request.

pub mod auth;
pub mod health;
pub mod kv;
pub mod meta;
pub mod visits;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::middleware::request_id_layer;
use crate::state::AppState;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Probes and readiness control
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/ready/enable", post(health::enable))
        .route("/ready/disable", post(health::disable))
        .route("/crash", post(health::crash))
        // Shared state
        .route("/visits", get(visits::visits))
        .route("/kv/{key}", get(kv::get_key).post(kv::set_key))
        // Auth
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Metadata and load generation
        .route("/", get(meta::root))
        .route("/config", get(meta::config))
        .route("/version", get(meta::version))
        .route("/info", get(meta::info))
        .route("/stress", get(meta::stress))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
        // Request ID middleware - creates root span for log correlation
        .layer(middleware::from_fn(request_id_layer))
}
