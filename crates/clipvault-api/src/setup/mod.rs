//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::services::PlaybackSigner;
use crate::state::AppState;
use anyhow::{Context, Result};
use clipvault_core::Config;
use clipvault_db::{PgUnitOfWork, VideoRepository};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let signer = PlaybackSigner::new(config.playback_signing_secret().as_bytes())
        .context("Failed to load playback signing secret")?;

    let state = Arc::new(AppState::new(
        storage,
        Arc::new(PgUnitOfWork::new(pool.clone())),
        Arc::new(VideoRepository::new(pool)),
        signer,
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
