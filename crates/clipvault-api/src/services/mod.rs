//! Application services
//!
//! `upload` drives video creation and the multipart upload lifecycle, `playback` gates viewer
//! access, and `signing` mints and checks playback links.

pub mod playback;
pub mod signing;
pub mod upload;

pub use playback::VideoViewingService;
pub use signing::PlaybackSigner;
pub use upload::{UploadCompletion, VideoManagementService};
