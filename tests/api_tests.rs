//! API integration tests.
//!
//! Drive the full router in-process against the in-memory store backend, so
//! every handler, extractor, and status mapping is exercised without a real
//! Redis. Store outages are simulated with the backend's availability
//! switch; session expiry with its movable clock.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use kubeling::config::AppConfig;
use kubeling::readiness::ReadinessController;
use kubeling::routes::create_router;
use kubeling::state::AppState;
use kubeling::store::{MemoryStore, SharedState};

/// Build an app backed by the given store, configured as pod "test-pod".
fn app_with_store(store: MemoryStore) -> Router {
    let config = AppConfig::from_lookup(|name| match name {
        "POD_NAME" => Some("test-pod".to_string()),
        "MAX_STRESS_SECONDS" => Some("1".to_string()),
        _ => None,
    });
    let shared = SharedState::new(
        Arc::new(store),
        config.instance.clone(),
        Duration::from_secs(config.session_ttl_seconds),
    );
    let state = AppState::new(config, ReadinessController::new(), shared);
    create_router(state)
}

fn test_app() -> Router {
    app_with_store(MemoryStore::new())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body read failed")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body was not JSON")
    };
    (status, body)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn post(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// POST /login and return (status, session cookie value).
async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .and_then(|pair| pair.strip_prefix("session_id="))
        .map(str::to_string);
    (status, cookie)
}

async fn get_with_cookie(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("session_id={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

// ---------------------------------------------------------------------------
// Probes and readiness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_is_always_ok() {
    let app = test_app();
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn readiness_starts_ready() {
    let app = test_app();
    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready" }));
}

#[tokio::test]
async fn readiness_toggle_roundtrip() {
    let app = test_app();

    let (status, body) = post(&app, "/ready/disable").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "not ready" }));

    let (status, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = post(&app, "/ready/enable").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ready" }));

    let (status, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn readiness_reflects_most_recent_toggle() {
    let app = test_app();
    post(&app, "/ready/disable").await;
    post(&app, "/ready/disable").await;
    post(&app, "/ready/enable").await;
    let (status, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn probes_send_no_store_cache_header() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

// ---------------------------------------------------------------------------
// Visit counter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn visits_increment_per_request() {
    let app = test_app();

    let (status, body) = get(&app, "/visits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 1);
    assert_eq!(body["server"], "test-pod");

    let (_, body) = get(&app, "/visits").await;
    assert_eq!(body["visits"], 2);
}

#[tokio::test]
async fn visits_degrade_to_503_when_store_is_down() {
    let store = MemoryStore::new();
    let app = app_with_store(store.clone());
    store.set_available(false);

    let (status, _) = get(&app, "/visits").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // The outage must not touch liveness or readiness.
    let (status, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

#[tokio::test]
async fn kv_missing_key_is_404() {
    let app = test_app();
    let (status, body) = get(&app, "/kv/nonexistent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "key not found");
}

#[tokio::test]
async fn kv_roundtrip() {
    let app = test_app();

    let (status, body) = post_json(&app, "/kv/greeting", json!({ "value": "hello" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "key": "greeting", "value": "hello" }));

    let (status, body) = get(&app, "/kv/greeting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "key": "greeting", "value": "hello" }));
}

#[tokio::test]
async fn kv_overwrite_last_write_wins() {
    let app = test_app();
    post_json(&app, "/kv/key1", json!({ "value": "first" })).await;
    post_json(&app, "/kv/key1", json!({ "value": "second" })).await;

    let (_, body) = get(&app, "/kv/key1").await;
    assert_eq!(body["value"], "second");
}

#[tokio::test]
async fn kv_degrades_to_503_when_store_is_down() {
    let store = MemoryStore::new();
    let app = app_with_store(store.clone());
    store.set_available(false);

    let (status, _) = get(&app, "/kv/test").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = post_json(&app, "/kv/test", json!({ "value": "hello" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_with_valid_credentials_sets_cookie() {
    let app = test_app();
    let (status, cookie) = login(&app, "admin", "admin").await;
    assert_eq!(status, StatusCode::OK);
    let token = cookie.expect("login must set a session cookie");
    assert_eq!(token.len(), 32);
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app();

    let (status, _) = login(&app, "admin", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = login(&app, "nobody", "x").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_degrades_to_503_when_store_is_down() {
    let store = MemoryStore::new();
    let app = app_with_store(store.clone());
    store.set_available(false);

    let (status, _) = login(&app, "admin", "admin").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn me_requires_a_valid_session() {
    let app = test_app();

    let (status, _) = get(&app, "/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_with_cookie(&app, "/me", "bogus").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_the_logged_in_user() {
    let app = test_app();
    let (_, cookie) = login(&app, "user", "user").await;
    let token = cookie.unwrap();

    // The session lives in the shared store, so it holds across requests.
    for _ in 0..3 {
        let (status, body) = get_with_cookie(&app, "/me", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "user");
        assert_eq!(body["server"], "test-pod");
    }
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let app = test_app();
    let (_, cookie) = login(&app, "admin", "admin").await;
    let token = cookie.unwrap();

    let (status, body) = send(
        &app,
        Request::builder()
            .method(Method::POST)
            .uri("/logout")
            .header(header::COOKIE, format!("session_id={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "logged out");

    let (status, _) = get_with_cookie(&app, "/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_without_cookie_still_succeeds() {
    let app = test_app();
    let (status, body) = post(&app, "/logout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "logged out");
}

#[tokio::test]
async fn session_expires_after_ttl() {
    let store = MemoryStore::new();
    let app = app_with_store(store.clone());
    let (_, cookie) = login(&app, "admin", "admin").await;
    let token = cookie.unwrap();

    store.advance(Duration::from_secs(3601));
    let (status, _) = get_with_cookie(&app, "/me", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_greets_with_instance() {
    let app = test_app();
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello from kubeling!");
    assert_eq!(body["server"], "test-pod");
}

#[tokio::test]
async fn config_reports_effective_values() {
    let app = test_app();
    let (status, body) = get(&app, "/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app_name"], "kubeling");
    assert_eq!(body["max_stress_seconds"], 1);
    assert_eq!(body["session_ttl"], 3600);
}

#[tokio::test]
async fn version_and_info_are_live_during_store_outage() {
    let store = MemoryStore::new();
    let app = app_with_store(store.clone());
    store.set_available(false);

    let (status, body) = get(&app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["server"], "test-pod");
    assert!(body["version"].is_string());

    let (status, body) = get(&app, "/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pod_name"], "test-pod");
}

#[tokio::test]
async fn stress_clamps_to_configured_maximum() {
    // MAX_STRESS_SECONDS is 1 in the test config, so this burns one second.
    let app = test_app();
    let (status, body) = get(&app, "/stress?seconds=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stressed_seconds"], 1);
    assert_eq!(body["server"], "test-pod");
}
