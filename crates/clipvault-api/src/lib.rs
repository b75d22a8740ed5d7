//! Clipvault API Library
//!
//! HTTP handlers, the upload orchestrator and playback gate services, and application setup.

mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use services::{PlaybackSigner, UploadCompletion, VideoManagementService, VideoViewingService};
pub use state::AppState;
