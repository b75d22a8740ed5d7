//! Storage setup

use anyhow::{Context, Result};
use clipvault_core::Config;
use clipvault_storage::{create_storage, VideoStorage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn VideoStorage>> {
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        bucket = %config.s3_bucket(),
        create_bucket = config.s3_create_bucket(),
        "Storage backend ready"
    );

    Ok(storage)
}
