//! Upload session orchestration
//!
//! Clients upload source files straight to storage with a multipart session. This service
//! starts the session, hands out one presigned URL per part, and on completion commits the
//! session before moving the video to transcoding inside a Unit of Work. If the database step
//! fails after storage accepted the object, the object is deleted again.

use clipvault_core::constants::{MAX_PART_COUNT, MIN_PART_SIZE};
use clipvault_core::models::PrepareUploadResponse;
use clipvault_core::{AppError, PartInfo, Video, VideoStatus, Visibility};
use clipvault_db::{with_transaction, UnitOfWork, VideoStore};
use clipvault_storage::{keys, VideoStorage};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Result of a completion call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCompletion {
    /// The video moved Initial -> Uploaded -> Transcoding and events were written
    Completed,
    /// The video had already left Initial; nothing changed
    AlreadyCompleted,
}

/// Number of parts a file of `file_size` bytes is split into.
pub fn part_count_for(file_size: u64) -> Result<u64, AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput(
            "file_size must be greater than 0".to_string(),
        ));
    }

    let part_count = file_size.div_ceil(MIN_PART_SIZE);
    if part_count > MAX_PART_COUNT {
        return Err(AppError::FileTooLarge {
            part_count,
            max_part_count: MAX_PART_COUNT,
        });
    }

    Ok(part_count)
}

/// Parts must be listed 1..=n in order, each with the identifier storage returned.
fn validate_parts(parts: &[PartInfo]) -> Result<(), AppError> {
    if parts.is_empty() {
        return Err(AppError::InvalidInput(
            "At least one part is required".to_string(),
        ));
    }
    if parts.len() as u64 > MAX_PART_COUNT {
        return Err(AppError::InvalidInput(format!(
            "At most {} parts are supported",
            MAX_PART_COUNT
        )));
    }

    for (index, part) in parts.iter().enumerate() {
        let expected = index as i64 + 1;
        if i64::from(part.part_number) != expected {
            return Err(AppError::InvalidInput(format!(
                "Part numbers must be contiguous from 1: expected {}, got {}",
                expected, part.part_number
            )));
        }
        if part.id.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Part {} is missing its etag",
                part.part_number
            )));
        }
    }

    Ok(())
}

/// Video management: creation, visibility and the upload session lifecycle
#[derive(Clone)]
pub struct VideoManagementService {
    storage: Arc<dyn VideoStorage>,
    uow: Arc<dyn UnitOfWork>,
    videos: Arc<dyn VideoStore>,
}

impl VideoManagementService {
    pub fn new(
        storage: Arc<dyn VideoStorage>,
        uow: Arc<dyn UnitOfWork>,
        videos: Arc<dyn VideoStore>,
    ) -> Self {
        Self {
            storage,
            uow,
            videos,
        }
    }

    pub async fn create_video(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Video, AppError> {
        let video = Video::new(Uuid::new_v4(), title, description).with_tags(tags);
        self.videos.insert(&video).await?;

        tracing::info!(video_id = %video.id(), "Video created");
        Ok(video)
    }

    pub async fn get_video(&self, video_id: Uuid) -> Result<Video, AppError> {
        self.videos
            .find_by_id(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))
    }

    pub async fn change_visibility(
        &self,
        video_id: Uuid,
        visibility: Visibility,
    ) -> Result<Video, AppError> {
        let video = with_transaction(self.uow.as_ref(), move |tx| {
            Box::pin(async move {
                let mut video = tx.find_video(video_id).await?;
                video.set_visibility(visibility);
                tx.save_video(&video).await?;
                Ok(video)
            })
        })
        .await?;

        tracing::info!(video_id = %video_id, visibility = %visibility, "Video visibility changed");
        Ok(video)
    }

    /// Start a multipart upload for the video's source and presign every part.
    ///
    /// The source key is derived from the video ID and stays out of the aggregate until the
    /// upload is committed. Calling this twice opens two independent sessions; whichever is
    /// completed first wins and the other is abandoned.
    #[tracing::instrument(skip(self))]
    pub async fn prepare_upload_session(
        &self,
        video_id: Uuid,
        file_size: u64,
    ) -> Result<PrepareUploadResponse, AppError> {
        let part_count = part_count_for(file_size)?;
        let key = keys::source_key(video_id);
        let start = Instant::now();

        let upload_id = self
            .storage
            .start_upload_session(&key)
            .await
            .map_err(|e| AppError::storage("Failed to start upload session", e))?;

        let mut urls = Vec::with_capacity(part_count as usize);
        for part_number in 1..=part_count as i32 {
            let url = self
                .storage
                .generate_upload_part_url(&key, &upload_id, part_number)
                .await
                .map_err(|e| {
                    AppError::storage(
                        format!("Failed to generate upload URL for part {}", part_number),
                        e,
                    )
                })?;
            urls.push(url);
        }

        tracing::info!(
            key = %key,
            upload_id = %upload_id,
            part_count,
            file_size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload session prepared"
        );

        Ok(PrepareUploadResponse {
            upload_id,
            urls,
            part_size: MIN_PART_SIZE,
            key,
        })
    }

    /// Commit the multipart session and move the video to transcoding.
    ///
    /// Retrying is safe: once the video has left `Initial` the database step is a no-op.
    /// Storage is committed first; if the transaction then fails, the committed source object
    /// is deleted (best effort) and the transaction error is returned. The source is kept when
    /// the transaction had already seen a completed video, since an earlier completion owns it.
    #[tracing::instrument(skip(self, parts), fields(part_count = parts.len()))]
    pub async fn complete_upload_session(
        &self,
        video_id: Uuid,
        upload_id: &str,
        parts: &[PartInfo],
    ) -> Result<UploadCompletion, AppError> {
        if upload_id.trim().is_empty() {
            return Err(AppError::InvalidInput("upload_id is required".to_string()));
        }
        // TODO: cross-check part identifiers against the parts storage recorded for the session
        validate_parts(parts)?;

        let source_key = keys::source_key(video_id);
        let stream_key = keys::stream_key(video_id);

        self.storage
            .commit_upload_session(&source_key, upload_id, parts)
            .await
            .map_err(|e| AppError::storage("Failed to commit upload session", e))?;

        let committed_key = source_key.clone();
        let source_in_use = Arc::new(AtomicBool::new(false));
        let seen_completed = source_in_use.clone();
        let result = with_transaction(self.uow.as_ref(), move |tx| {
            Box::pin(async move {
                let mut video = tx.find_video(video_id).await?;
                if video.status() != VideoStatus::Initial {
                    seen_completed.store(true, Ordering::SeqCst);
                    return Ok(UploadCompletion::AlreadyCompleted);
                }

                video.mark_uploaded(committed_key)?;
                video.start_transcoding(stream_key)?;
                tx.save_video(&video).await?;

                let events = video.pull_events();
                tx.append_events(events).await?;
                Ok(UploadCompletion::Completed)
            })
        })
        .await;

        match result {
            Ok(UploadCompletion::Completed) => {
                tracing::info!(key = %source_key, "Upload completed, transcoding requested");
                Ok(UploadCompletion::Completed)
            }
            Ok(UploadCompletion::AlreadyCompleted) => {
                tracing::info!(key = %source_key, "Upload already completed, nothing to do");
                Ok(UploadCompletion::AlreadyCompleted)
            }
            Err(err) if source_in_use.load(Ordering::SeqCst) => {
                tracing::warn!(
                    key = %source_key,
                    error = %err,
                    "Transaction failed on an already completed upload, keeping source"
                );
                Err(err)
            }
            Err(err) => {
                self.discard_source(&source_key, &err).await;
                Err(err)
            }
        }
    }

    async fn discard_source(&self, source_key: &str, cause: &AppError) {
        match self.storage.delete_source(source_key).await {
            Ok(()) => tracing::warn!(
                key = %source_key,
                cause = %cause,
                "Deleted committed source after failed transaction"
            ),
            Err(delete_err) => tracing::error!(
                key = %source_key,
                cause = %cause,
                error = %delete_err,
                "Failed to delete committed source after failed transaction"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(numbers: &[i32]) -> Vec<PartInfo> {
        numbers
            .iter()
            .map(|n| PartInfo {
                part_number: *n,
                id: format!("\"etag-{}\"", n),
            })
            .collect()
    }

    #[test]
    fn test_part_count_boundaries() {
        assert_eq!(part_count_for(1).unwrap(), 1);
        assert_eq!(part_count_for(MIN_PART_SIZE).unwrap(), 1);
        assert_eq!(part_count_for(MIN_PART_SIZE + 1).unwrap(), 2);
        assert_eq!(
            part_count_for(MIN_PART_SIZE * MAX_PART_COUNT).unwrap(),
            MAX_PART_COUNT
        );
    }

    #[test]
    fn test_part_count_over_ceiling() {
        let err = part_count_for(MIN_PART_SIZE * MAX_PART_COUNT + 1).unwrap_err();
        assert!(matches!(
            err,
            AppError::FileTooLarge {
                part_count: 10_001,
                max_part_count: 10_000
            }
        ));
        assert!(matches!(
            part_count_for(u64::MAX),
            Err(AppError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(part_count_for(0), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_valid_part_list() {
        assert!(validate_parts(&parts(&[1])).is_ok());
        assert!(validate_parts(&parts(&[1, 2, 3])).is_ok());
    }

    #[test]
    fn test_invalid_part_lists() {
        assert!(validate_parts(&[]).is_err());
        assert!(validate_parts(&parts(&[2, 3])).is_err());
        assert!(validate_parts(&parts(&[1, 3])).is_err());
        assert!(validate_parts(&parts(&[2, 1])).is_err());
        assert!(validate_parts(&parts(&[1, 1])).is_err());

        let mut blank = parts(&[1, 2]);
        blank[1].id = "  ".to_string();
        assert!(validate_parts(&blank).is_err());
    }
}
