//! Clipvault Core Library
//!
//! This crate provides the video domain model, error types, configuration and
//! fixed limits shared across all Clipvault components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{PartInfo, Video, VideoEvent, VideoStatus, Visibility};
