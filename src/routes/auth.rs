//! Session endpoints: login, logout, and the current-user probe.
//!
//! The cookie carries only the opaque session token; the record itself lives
//! in the shared store, so a logged-in user stays logged in no matter which
//! instance serves the next request.

use axum::{
    extract::State,
    response::Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::json;

use crate::config::SESSION_COOKIE;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

/// POST /login: validate credentials, create a session in the shared store,
/// and hand the token back as an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    let token = state
        .shared
        .create_session(&body.username, &body.password)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .build();

    Ok((
        jar.add(cookie),
        Json(json!({ "message": "logged in", "username": body.username })),
    ))
}

/// POST /logout: delete the session and clear the cookie.
///
/// Succeeds with or without a cookie, and even during a store outage; a
/// session that could not be deleted expires on its own TTL anyway.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(err) = state.shared.destroy_session(cookie.value()).await {
            tracing::debug!(error = %err, "session delete skipped during logout");
        }
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Json(json!({ "message": "logged out" })))
}

/// GET /me: resolve the session cookie to a username, 401 otherwise.
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AppError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(AppError::Unauthenticated)?;
    let username = state.shared.resolve_session(cookie.value()).await?;

    Ok(Json(json!({
        "username": username,
        "server": state.config.instance,
    })))
}
