#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use boardtrack_api::auth::jwt::{generate_access_token, JwtConfig};
use boardtrack_api::config::ServerConfig;
use boardtrack_api::router::build_app_router;
use boardtrack_api::state::AppState;
use boardtrack_api::ws::WsManager;
use boardtrack_core::config::TrackerConfig;

pub const TEST_EMAIL: &str = "ana@example.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-at-least-32-bytes-long!!".to_string(),
            issuer: None,
        },
        tracker: TrackerConfig::default(),
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let state = AppState::new(pool, config.clone(), Arc::new(WsManager::new()));
    build_app_router(state, &config)
}

/// A bearer token for [`TEST_EMAIL`] signed with the test secret.
pub fn token() -> String {
    generate_access_token("uid-ana", TEST_EMAIL, 15, &test_config().jwt)
        .expect("token generation")
}

fn request(method: Method, uri: &str, body: Option<serde_json::Value>, auth: bool) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if auth {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token()));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(request(Method::GET, uri, None, false))
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(request(Method::GET, uri, None, true))
        .await
        .unwrap()
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(request(Method::POST, uri, Some(body), true))
        .await
        .unwrap()
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(request(Method::PUT, uri, Some(body), true))
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
