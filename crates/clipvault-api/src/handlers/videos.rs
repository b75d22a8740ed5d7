use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use clipvault_core::models::{
    list_limit, CreateVideoRequest, ListVideosQuery, PlaybackInfo, SearchVideosQuery,
    UpdateVisibilityRequest, VideoListResponse, VideoResponse,
};
use clipvault_core::{AppError, Video};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn list_response(videos: &[Video]) -> VideoListResponse {
    VideoListResponse {
        items: videos.iter().map(VideoResponse::from).collect(),
    }
}

/// Create a video record; its source is uploaded separately
#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video created", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "create_video"))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .management
        .create_video(request.title, request.description, request.tags)
        .await?;

    Ok((StatusCode::CREATED, Json(VideoResponse::from(&video))))
}

/// Ready, public videos, newest first
#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    params(ListVideosQuery),
    responses(
        (status = 200, description = "Public videos", body = VideoListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListVideosQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let videos = state
        .viewing
        .list_public_videos(list_limit(query.limit))
        .await?;
    Ok(Json(list_response(&videos)))
}

/// Ready, public videos carrying a tag
#[utoipa::path(
    get,
    path = "/api/videos/search",
    tag = "videos",
    params(SearchVideosQuery),
    responses(
        (status = 200, description = "Matching videos", body = VideoListResponse),
        (status = 400, description = "Missing or invalid tag", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query), fields(operation = "search_videos"))]
pub async fn search_videos(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchVideosQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    query.validate().map_err(AppError::from)?;
    let videos = state
        .viewing
        .search_by_tag(&query.tag, list_limit(query.limit))
        .await?;
    Ok(Json(list_response(&videos)))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video details", body = VideoResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state.management.get_video(id).await?;
    Ok(Json(VideoResponse::from(&video)))
}

#[utoipa::path(
    patch,
    path = "/api/videos/{id}/visibility",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = UpdateVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = VideoResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(video_id = %id, operation = "change_visibility"))]
pub async fn update_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateVisibilityRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = state
        .management
        .change_visibility(id, request.visibility)
        .await?;

    Ok(Json(VideoResponse::from(&video)))
}

/// Signed playback path for a ready, public video
#[utoipa::path(
    get,
    path = "/api/videos/{id}/playback-info",
    tag = "playback",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Playback info", body = PlaybackInfo),
        (status = 403, description = "Video is not public", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 409, description = "Video is not ready", body = ErrorResponse)
    )
)]
pub async fn get_playback_info(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let info = state.viewing.get_playback_info(id).await?;
    Ok(Json(info))
}
