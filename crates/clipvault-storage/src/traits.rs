//! Storage gateway trait
//!
//! This module defines the `VideoStorage` trait every object-storage backend implements.

use async_trait::async_trait;
use clipvault_core::PartInfo;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload session failed: {0}")]
    SessionFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage gateway used by the upload orchestrator and the playback gate.
///
/// Clients upload source files directly to storage in parts; the service only starts,
/// presigns and commits the multipart session. Keys follow the layout documented at
/// the crate root.
#[async_trait]
pub trait VideoStorage: Send + Sync {
    /// Start a multipart upload for `key` and return the session (upload) ID.
    async fn start_upload_session(&self, key: &str) -> StorageResult<String>;

    /// Presign a URL the client PUTs part `part_number` (1-based) of the session to.
    async fn generate_upload_part_url(
        &self,
        key: &str,
        session_id: &str,
        part_number: i32,
    ) -> StorageResult<String>;

    /// Commit the session, assembling the object from `parts` in the given order.
    async fn commit_upload_session(
        &self,
        key: &str,
        session_id: &str,
        parts: &[PartInfo],
    ) -> StorageResult<()>;

    /// Presign a short-lived GET URL for exactly `key`.
    async fn generate_temporary_access_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Delete an uploaded source object.
    async fn delete_source(&self, key: &str) -> StorageResult<()>;
}
