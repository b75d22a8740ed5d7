//! Data models for the application
//!
//! `video` holds the aggregate root and its events; `upload` holds the request and
//! response shapes of the upload and playback operations.

mod upload;
mod video;

pub use upload::*;
pub use video::*;
