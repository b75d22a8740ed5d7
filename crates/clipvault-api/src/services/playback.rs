//! Playback access gate
//!
//! Only ready, public videos are playable. Viewers first get a signed playback path, then
//! redeem it object by object for short-lived storage URLs.

use chrono::Utc;
use clipvault_core::constants::{DEFAULT_STREAM_OBJECT, PLAYBACK_MIME_TYPE, STREAM_URL_TTL};
use clipvault_core::models::PlaybackInfo;
use clipvault_core::{AppError, Video, VideoStatus, Visibility};
use clipvault_db::VideoStore;
use clipvault_storage::{keys, VideoStorage};
use std::sync::Arc;
use uuid::Uuid;

use super::signing::PlaybackSigner;

/// Readiness is checked before visibility, so a private video that is still processing
/// always reports `VideoNotReady`.
fn ensure_playable(video: &Video) -> Result<(), AppError> {
    if video.status() != VideoStatus::Ready {
        return Err(AppError::VideoNotReady);
    }
    if video.visibility() != Visibility::Public {
        return Err(AppError::VideoForbidden);
    }
    Ok(())
}

/// Normalize a requested object path relative to a stream prefix.
///
/// Empty segments and `.` are dropped and `..` pops the previous segment. Absolute paths,
/// backslashes and a `..` that would climb out of the prefix are `VideoForbidden`. An empty
/// result means the playlist itself.
pub fn clean_object_path(requested: &str) -> Result<String, AppError> {
    if requested.starts_with('/') || requested.contains('\\') {
        return Err(AppError::VideoForbidden);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in requested.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(AppError::VideoForbidden);
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Ok(DEFAULT_STREAM_OBJECT.to_string());
    }
    Ok(segments.join("/"))
}

/// Read-side service for viewers
#[derive(Clone)]
pub struct VideoViewingService {
    videos: Arc<dyn VideoStore>,
    storage: Arc<dyn VideoStorage>,
    signer: PlaybackSigner,
}

impl VideoViewingService {
    pub fn new(
        videos: Arc<dyn VideoStore>,
        storage: Arc<dyn VideoStorage>,
        signer: PlaybackSigner,
    ) -> Self {
        Self {
            videos,
            storage,
            signer,
        }
    }

    pub fn signer(&self) -> &PlaybackSigner {
        &self.signer
    }

    async fn load_playable(&self, video_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;
        ensure_playable(&video)?;
        Ok(video)
    }

    /// Ready, public videos, newest first.
    pub async fn list_public_videos(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        self.videos.list_public(limit).await
    }

    /// Ready, public videos carrying `tag`, newest first.
    pub async fn search_by_tag(&self, tag: &str, limit: i64) -> Result<Vec<Video>, AppError> {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return Err(AppError::InvalidInput("tag is required".to_string()));
        }
        self.videos.find_by_tag(&tag, limit).await
    }

    /// Signed playback path and MIME type for a playable video.
    pub async fn get_playback_info(&self, video_id: Uuid) -> Result<PlaybackInfo, AppError> {
        self.load_playable(video_id).await?;

        Ok(PlaybackInfo {
            playback_url: self.signer.signed_path(video_id, Utc::now()),
            mime_type: PLAYBACK_MIME_TYPE.to_string(),
        })
    }

    /// Temporary storage URL for one object under the video's stream prefix.
    pub async fn get_video_stream(
        &self,
        video_id: Uuid,
        object_path: &str,
    ) -> Result<String, AppError> {
        let video = self.load_playable(video_id).await?;
        let relative = clean_object_path(object_path)?;

        let stream_key = video.stream_key().ok_or_else(|| {
            AppError::Internal(format!("Ready video {} has no stream key", video_id))
        })?;
        let key = keys::stream_object_key(stream_key, &relative);

        let url = self
            .storage
            .generate_temporary_access_url(&key, STREAM_URL_TTL)
            .await
            .map_err(|e| AppError::storage("Failed to generate stream URL", e))?;

        tracing::debug!(video_id = %video_id, key = %key, "Stream URL issued");
        Ok(url)
    }
}
