//! Test utilities for database and router testing.
//!
//! Sets up in-memory SQLite databases with migrations applied and routers
//! wired to a temporary audit log.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use call_intake::{
    attribution::SourceMaps,
    audit_log::FileAuditLog,
    config::AppConfig,
    providers::ProviderRegistry,
    server::{AppState, create_app},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tempfile::TempDir;

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A router over a fresh database and a temporary audit log.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub audit_log_path: PathBuf,
    _audit_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        Self::with_sources(SourceMaps::builtin()).await
    }

    pub async fn with_sources(sources: SourceMaps) -> Result<Self> {
        let db = setup_test_db().await?;
        let audit_dir = TempDir::new()?;
        let audit_log_path = audit_dir.path().join("webhooks.log");

        let state = AppState {
            config: Arc::new(AppConfig {
                profile: "test".to_string(),
                database_url: "sqlite::memory:".to_string(),
                audit_log_path: audit_log_path.clone(),
                ..Default::default()
            }),
            db: db.clone(),
            registry: Arc::new(ProviderRegistry::with_sources(&sources)),
            audit_log: Arc::new(FileAuditLog::new(audit_log_path.clone())),
        };

        Ok(Self {
            router: create_app(state),
            db,
            audit_log_path,
            _audit_dir: audit_dir,
        })
    }

    /// Audit log contents, empty when nothing was written.
    pub fn audit_log(&self) -> String {
        std::fs::read_to_string(&self.audit_log_path).unwrap_or_default()
    }
}

/// Builds a webhook POST for `provider`.
pub fn webhook_request(provider: &str, content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/webhooks/{provider}"))
        .header(header::CONTENT_TYPE, content_type)
        .body(body.into())
        .expect("valid request")
}

/// Collects a response body as JSON.
pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("JSON body")
}
