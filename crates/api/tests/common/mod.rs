#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tasklog_core::memory::{MemoryAuditStore, MemoryTaskStore};
use tasklog_core::service::TaskService;
use tower::ServiceExt;

use tasklog_api::config::ServerConfig;
use tasklog_api::router::build_app_router;
use tasklog_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
    }
}

/// Build the full application router with all middleware layers, backed by
/// fresh in-memory stores.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app() -> Router {
    let config = test_config();
    let service = TaskService::new(
        Arc::new(MemoryTaskStore::new()),
        Arc::new(MemoryAuditStore::new()),
    );
    let state = AppState {
        service: Arc::new(service),
    };
    build_app_router(state, &config).expect("test config is valid")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("user-agent", "tasklog-tests/1.0")
        .header("x-forwarded-for", "203.0.113.9");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// Anonymous GET (no `X-User-Id`).
pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_as(app: &Router, user: &str, uri: &str) -> Response {
    send(app, Method::GET, uri, Some(user), None).await
}

pub async fn post_json_as(app: &Router, user: &str, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(user), Some(body)).await
}

pub async fn put_json_as(app: &Router, user: &str, uri: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(user), Some(body)).await
}

pub async fn delete_as(app: &Router, user: &str, uri: &str) -> Response {
    send(app, Method::DELETE, uri, Some(user), None).await
}

/// Create a task through the API and return its id.
pub async fn create_task(app: &Router, user: &str, title: &str, is_public: bool) -> i64 {
    let response = post_json_as(
        app,
        user,
        "/api/v1/tasks",
        serde_json::json!({
            "title": title,
            "description": format!("{title} details"),
            "due_date": "2024-06-30",
            "is_public": is_public,
            "responsible": "alice",
            "tags": ["work", "q2"],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
