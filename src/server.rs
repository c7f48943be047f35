//! # Server Configuration
//!
//! This module contains the router, shared state and serve loop for the
//! call intake API.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::attribution::SourceMaps;
use crate::audit_log::{AuditSink, FileAuditLog};
use crate::config::AppConfig;
use crate::handlers;
use crate::providers::ProviderRegistry;
use crate::telemetry::trace_context_middleware;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub registry: Arc<ProviderRegistry>,
    pub audit_log: Arc<dyn AuditSink>,
}

impl AppState {
    /// State wired from configuration: file audit log at the configured path.
    pub fn new(config: AppConfig, db: DatabaseConnection, sources: &SourceMaps) -> Self {
        let audit_log = FileAuditLog::new(config.audit_log_path.clone());
        Self {
            config: Arc::new(config),
            db,
            registry: Arc::new(ProviderRegistry::with_sources(sources)),
            audit_log: Arc::new(audit_log),
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes());

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route(
            "/webhooks/{provider}",
            post(handlers::webhooks::receive_webhook).layer(body_limit),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let sources = SourceMaps::load(config.source_map_path.as_deref())?;
    info!(
        callrail_sources = sources.callrail.len(),
        twilio_sources = sources.twilio.len(),
        "Loaded source maps"
    );

    let addr = config.bind_addr()?;
    let profile = config.profile.clone();
    let state = AppState::new(config, db, &sources);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Waits for CTRL+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("Shutdown signal received, draining in-flight requests");
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::webhooks::receive_webhook,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::webhooks::WebhookAcceptResponse,
            crate::error::ApiError,
        )
    ),
    tags(
        (name = "root", description = "Service information and health"),
        (name = "webhooks", description = "Inbound call webhooks"),
    ),
    info(
        title = "Call Intake API",
        description = "Receives CallRail and Twilio call webhooks and records attributed calls",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
