#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use devwatch_core::engine::{AlertConfig, AlertEngine};
use devwatch_db::store::PgStore;
use devwatch_events::MailNotifier;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use devwatch_api::config::ServerConfig;
use devwatch_api::router::build_app_router;
use devwatch_api::state::AppState;

/// Recipient used by every test engine.
pub const TEST_RECIPIENT: &str = "alerts@test.local";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        alert_email_to: TEST_RECIPIENT.to_string(),
    }
}

/// Build the full application router over `pool`, with email delivery
/// disabled.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_shutdown(pool, CancellationToken::new())
}

/// Like [`build_test_app`], but wired to a caller-owned shutdown token.
pub fn build_test_app_with_shutdown(pool: PgPool, shutdown: CancellationToken) -> Router {
    let config = test_config();
    let store = PgStore::new(pool.clone());
    let engine = AlertEngine::new(
        store.clone(),
        store,
        MailNotifier::Disabled,
        AlertConfig {
            recipient: config.alert_email_to.clone(),
        },
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine: Arc::new(engine),
        shutdown,
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    app.oneshot(Request::delete(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    app.oneshot(Request::post(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, "POST", uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, "PUT", uri, body).await
}

async fn send_json(app: Router, method: &str, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a device through the API and return its id.
pub async fn create_device(pool: &PgPool, name: &str, status: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/devices",
        serde_json::json!({ "name": name, "status": status }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Create an alert rule through the API and return its id.
pub async fn create_rule(pool: &PgPool, level: &str, message: &str) -> i64 {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/alerts",
        serde_json::json!({ "level": level, "message": message }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
