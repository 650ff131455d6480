//! Liveness and readiness endpoints for container orchestration.
//!
//! Liveness (`/health`) answers 200 whenever the process can respond at all;
//! it deliberately depends on nothing external, so a hung store can never
//! make the orchestrator restart a healthy pod. Readiness (`/ready`) reports
//! the per-instance flag that the toggle endpoints flip; the orchestrator
//! reads it before routing traffic, this service itself never does.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::state::AppState;

/// Liveness probe. Always 200 while the process runs.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness probe: 200 while the flag is set, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    if state.readiness.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not ready" })),
        )
    }
}

/// Mark this instance ready. Idempotent.
pub async fn enable(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.readiness.set_ready(true);
    tracing::info!("readiness enabled");
    Json(json!({ "status": "ready" }))
}

/// Mark this instance not ready, draining it out of the load balancer at the
/// orchestrator's next poll. Idempotent.
pub async fn disable(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.readiness.set_ready(false);
    tracing::info!("readiness disabled");
    Json(json!({ "status": "not ready" }))
}

/// Kill this pod abruptly so the platform's restart behavior can be
/// observed. Never returns; the connection simply drops.
pub async fn crash(State(state): State<AppState>) -> &'static str {
    tracing::warn!("crash requested, exiting immediately");
    state.readiness.crash()
}
