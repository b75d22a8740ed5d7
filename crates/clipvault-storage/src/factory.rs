#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{StorageError, StorageResult, VideoStorage};
use clipvault_core::Config;
use std::sync::Arc;

/// Create the storage gateway from configuration
#[cfg(feature = "storage-s3")]
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn VideoStorage>> {
    let region = config.s3_region().map(String::from).ok_or_else(|| {
        StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
    })?;

    let storage = S3Storage::new(
        config.s3_bucket().to_string(),
        region,
        config.s3_endpoint().map(String::from),
        config.s3_public_url().map(String::from),
    )
    .await?;

    if config.s3_create_bucket() {
        storage.ensure_bucket().await?;
    }

    Ok(Arc::new(storage))
}

#[cfg(not(feature = "storage-s3"))]
pub async fn create_storage(_config: &Config) -> StorageResult<Arc<dyn VideoStorage>> {
    Err(StorageError::ConfigError(
        "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
    ))
}
