//! Key-value endpoints backed by the shared store.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

/// Request body for POST /kv/{key}.
#[derive(Debug, Deserialize)]
pub struct KeyValueBody {
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct KeyValueResponse {
    pub key: String,
    pub value: String,
}

/// GET /kv/{key}: 200 with the value, 404 if absent.
pub async fn get_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<KeyValueResponse>, AppError> {
    let value = state.shared.get_value(&key).await?;
    Ok(Json(KeyValueResponse { key, value }))
}

/// POST /kv/{key}: create or overwrite. Last writer wins.
pub async fn set_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<KeyValueBody>,
) -> Result<Json<KeyValueResponse>, AppError> {
    state.shared.set_value(&key, &body.value).await?;
    Ok(Json(KeyValueResponse {
        key,
        value: body.value,
    }))
}
