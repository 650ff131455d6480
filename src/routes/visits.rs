//! Shared visit counter endpoint.

use axum::{extract::State, response::Json};

use crate::error::AppError;
use crate::state::AppState;
use crate::store::VisitCount;

/// Increment and return the visit counter shared by all instances.
///
/// With several replicas behind one Service, repeated requests show the
/// `server` field hopping between pods while `visits` keeps climbing; that
/// is the whole demonstration.
pub async fn visits(State(state): State<AppState>) -> Result<Json<VisitCount>, AppError> {
    let count = state.shared.increment_visits().await?;
    Ok(Json(count))
}
