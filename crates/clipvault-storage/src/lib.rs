//! Clipvault Storage Library
//!
//! This crate provides the storage gateway used by the upload orchestrator and the
//! playback gate: multipart upload sessions, presigned URLs and source cleanup.
//!
//! # Storage key format
//!
//! Keys are derived from the video ID only, so every backend agrees on them:
//!
//! - **Source**: `videos/{video_id}/source`
//! - **Renditions**: `videos/{video_id}/stream/{object}`
//!
//! Key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipvault_core::PartInfo;
pub use factory::create_storage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{StorageError, StorageResult, VideoStorage};
