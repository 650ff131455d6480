use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Application error taxonomy, mapped onto HTTP statuses by `IntoResponse`.
///
/// A store outage degrades only the store-dependent endpoints to 503; health,
/// readiness, and configuration endpoints never produce these errors, which is
/// what keeps them operational during an outage.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The external store could not be reached or timed out. Transient;
    /// surfaced immediately, never retried internally.
    #[error("store unavailable")]
    StoreUnavailable,

    /// Absent key. A normal outcome, not logged as an error.
    #[error("key not found")]
    NotFound,

    /// Login credentials did not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Missing, expired, or unknown session.
    #[error("not authenticated")]
    Unauthenticated,

    /// Unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store operation failed");
        AppError::StoreUnavailable
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => {
                tracing::error!("internal error: {:?}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
