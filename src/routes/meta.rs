//! Metadata endpoints and the CPU load generator.
//!
//! These are the endpoints that make scaling demos legible: `/` and
//! `/version` show which pod answered, `/config` shows what the ConfigMap
//! injected, `/info` echoes Downward-API pod metadata, and `/stress` burns
//! CPU so a horizontal autoscaler has something to react to.

use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::config::PodInfo;
use crate::error::AppError;
use crate::state::AppState;

/// GET /: greeting with the serving instance.
pub async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": format!("Hello from {}!", state.config.app_name),
        "server": state.config.instance,
    }))
}

/// GET /config: the env-derived configuration currently in effect.
pub async fn config(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "app_name": state.config.app_name,
        "log_format": state.config.log_format,
        "max_stress_seconds": state.config.max_stress_seconds,
        "session_ttl": state.config.session_ttl_seconds,
    }))
}

/// GET /version: compile-time version plus the serving instance.
pub async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "version": crate::config::AppConfig::version(),
        "server": state.config.instance,
    }))
}

/// GET /info: pod metadata injected via Downward API env vars.
pub async fn info(State(state): State<AppState>) -> Json<PodInfo> {
    Json(state.config.pod.clone())
}

#[derive(Debug, Deserialize)]
pub struct StressQuery {
    pub seconds: Option<u64>,
}

/// GET /stress?seconds=N: burn CPU for N seconds, clamped to the configured
/// maximum. Runs on a blocking worker thread so the async executor keeps
/// serving probes while the burn is in progress.
pub async fn stress(
    State(state): State<AppState>,
    Query(query): Query<StressQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let seconds = query
        .seconds
        .unwrap_or(10)
        .min(state.config.max_stress_seconds);
    tracing::info!(
        seconds,
        max = state.config.max_stress_seconds,
        "stress starting"
    );

    tokio::task::spawn_blocking(move || {
        let end = Instant::now() + Duration::from_secs(seconds);
        while Instant::now() < end {
            std::hint::black_box((0..10_000u64).map(|i| i * i).sum::<u64>());
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("stress worker failed: {e}")))?;

    tracing::info!(seconds, "stress completed");
    Ok(Json(json!({
        "stressed_seconds": seconds,
        "server": state.config.instance,
    })))
}
