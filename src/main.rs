//! # Call Intake Main Entry Point
//!
//! Loads configuration, initializes telemetry and the database, applies
//! migrations when enabled, then serves the webhook API.

use anyhow::Context;
use call_intake::{
    config::ConfigLoader,
    db::init_pool,
    migration::{Migrator, MigratorTrait},
    server::run_server,
    telemetry::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    init_tracing(&config)?;

    info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        info!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .context("failed to apply migrations")?;
        info!("Migrations applied");
    }

    run_server(config, db).await
}
