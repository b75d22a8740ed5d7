use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::video::{VideoResponse, Visibility};
use crate::constants::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT, MAX_TAGS, MAX_TAG_LEN};

/// One uploaded part as reported back by the client after a direct upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PartInfo {
    /// 1-based part number
    pub part_number: i32,
    /// Identifier storage returned for the part (the ETag for S3)
    #[serde(rename = "etag")]
    pub id: String,
}

/// Request to start a multipart upload for a video's source file
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PrepareUploadRequest {
    /// Total file size in bytes
    #[validate(range(min = 1, message = "file_size must be greater than 0"))]
    pub file_size: u64,
}

/// Everything the client needs to upload the parts directly to storage
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrepareUploadResponse {
    /// Multipart session ID, echoed back on completion
    pub upload_id: String,
    /// Presigned URL per part, in part-number order
    pub urls: Vec<String>,
    /// Size of every part except possibly the last
    pub part_size: u64,
    /// Storage key the source will land at
    pub key: String,
}

/// Request to commit a multipart upload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CompleteUploadRequest {
    #[validate(length(min = 1, message = "upload_id is required"))]
    pub upload_id: String,
    #[validate(length(min = 1, message = "At least one part is required"))]
    pub parts: Vec<PartInfo>,
}

/// Signed playback entry point for a ready, public video
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlaybackInfo {
    /// Signed path; the HTTP layer re-derives the signature before proxying
    pub playback_url: String,
    pub mime_type: String,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateVideoRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_tags"))]
    pub tags: Vec<String>,
}

fn validate_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::new("too_many_tags")
            .with_message(format!("At most {} tags are allowed", MAX_TAGS).into()));
    }
    if tags.iter().any(|tag| tag.trim().chars().count() > MAX_TAG_LEN) {
        return Err(ValidationError::new("tag_too_long")
            .with_message(format!("Tags must be at most {} characters", MAX_TAG_LEN).into()));
    }
    Ok(())
}

/// Paging for public listings
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVideosQuery {
    /// Page size, 1 to 100 (default 20)
    pub limit: Option<i64>,
}

/// Tag search over public videos
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct SearchVideosQuery {
    #[validate(length(min = 1, max = 32, message = "tag must be between 1 and 32 characters"))]
    pub tag: String,
    /// Page size, 1 to 100 (default 20)
    pub limit: Option<i64>,
}

/// Clamp a requested page size into the supported range.
pub fn list_limit(requested: Option<i64>) -> i64 {
    requested
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoListResponse {
    pub items: Vec<VideoResponse>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateVisibilityRequest {
    pub visibility: Visibility,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_info_uses_etag_field_name() {
        let part: PartInfo =
            serde_json::from_str(r#"{"part_number": 3, "etag": "\"abc\""}"#).unwrap();
        assert_eq!(part.part_number, 3);
        assert_eq!(part.id, "\"abc\"");
    }

    #[test]
    fn test_prepare_request_rejects_zero_size() {
        let req = PrepareUploadRequest { file_size: 0 };
        assert!(req.validate().is_err());
        let req = PrepareUploadRequest { file_size: 1 };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_tag_limits() {
        let request = |tags: Vec<String>| CreateVideoRequest {
            title: "Demo".to_string(),
            description: String::new(),
            tags,
        };

        assert!(request(vec!["music".to_string()]).validate().is_ok());
        assert!(request(vec!["x".repeat(MAX_TAG_LEN + 1)]).validate().is_err());
        assert!(request(vec!["t".to_string(); MAX_TAGS + 1]).validate().is_err());
    }

    #[test]
    fn test_list_limit_is_clamped() {
        assert_eq!(list_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(list_limit(Some(0)), 1);
        assert_eq!(list_limit(Some(5)), 5);
        assert_eq!(list_limit(Some(10_000)), MAX_LIST_LIMIT);
    }
}
