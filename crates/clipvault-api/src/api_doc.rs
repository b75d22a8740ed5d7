//! OpenAPI documentation, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipvault_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipvault API",
        version = "0.1.0",
        description = "Video upload sessions with direct-to-storage multipart uploads, lifecycle tracking and signed HLS playback links."
    ),
    paths(
        handlers::videos::create_video,
        handlers::videos::list_videos,
        handlers::videos::search_videos,
        handlers::videos::get_video,
        handlers::videos::update_visibility,
        handlers::videos::get_playback_info,
        handlers::video_upload::prepare_upload,
        handlers::video_upload::complete_upload,
        handlers::video_stream::stream_object,
    ),
    components(schemas(
        models::VideoResponse,
        models::VideoListResponse,
        models::VideoStatus,
        models::Visibility,
        models::CreateVideoRequest,
        models::UpdateVisibilityRequest,
        models::PrepareUploadRequest,
        models::PrepareUploadResponse,
        models::CompleteUploadRequest,
        models::PartInfo,
        models::PlaybackInfo,
        error::ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video records"),
        (name = "uploads", description = "Multipart upload sessions"),
        (name = "playback", description = "Signed playback access"),
    )
)]
pub struct ApiDoc;
