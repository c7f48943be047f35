//! # Tests for Handlers
//!
//! Router-level tests for the root, health and webhook endpoints.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;

use crate::attribution::SourceMaps;
use crate::audit_log::FileAuditLog;
use crate::config::AppConfig;
use crate::handlers::root;
use crate::providers::ProviderRegistry;
use crate::server::{AppState, create_app};
use crate::telemetry::TRACE_ID_HEADER;

fn state_with(db: DatabaseConnection, audit_dir: &std::path::Path) -> AppState {
    AppState {
        config: Arc::new(AppConfig {
            max_body_kb: 1,
            ..Default::default()
        }),
        db,
        registry: Arc::new(ProviderRegistry::with_sources(&SourceMaps::builtin())),
        audit_log: Arc::new(FileAuditLog::new(audit_dir.join("webhooks.log"))),
    }
}

async fn migrated_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .unwrap()
}

async fn app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(state_with(migrated_db().await, dir.path()));
    (app, dir)
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let axum::Json(info) = root().await;
    assert_eq!(info.service, "call-intake");
    assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_healthz_ok_with_live_database() {
    let (app, _dir) = app().await;

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_healthz_unavailable_without_database() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_app(state_with(DatabaseConnection::default(), dir.path()));

    let response = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_unknown_provider_is_404() {
    let (app, dir) = app().await;

    let response = app
        .oneshot(post("/webhooks/plivo", "application/json", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
    assert!(!dir.path().join("webhooks.log").exists());
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let (app, _dir) = app().await;
    let body = format!("From=1&To=2&CallerName={}", "x".repeat(2048));

    let response = app
        .oneshot(post(
            "/webhooks/twilio",
            "application/x-www-form-urlencoded",
            body,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_success_envelope() {
    let (app, _dir) = app().await;

    let response = app
        .oneshot(post(
            "/webhooks/twilio",
            "application/x-www-form-urlencoded",
            "From=2025551234&To=8009701002",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "success"}));
}

#[tokio::test]
async fn test_error_body_carries_request_trace_id() {
    let (app, _dir) = app().await;

    let mut request = post("/webhooks/callrail", "application/json", "{broken");
    request
        .headers_mut()
        .insert(TRACE_ID_HEADER, "req-1234".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[TRACE_ID_HEADER], "req-1234");
    let json = body_json(response).await;
    assert_eq!(json["trace_id"], "req-1234");
    assert_eq!(json["code"], "INVALID_PAYLOAD");
}

#[tokio::test]
async fn test_openapi_document_lists_webhook_route() {
    let (app, _dir) = app().await;

    let response = app
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/webhooks/{provider}"]["post"].is_object());
}
