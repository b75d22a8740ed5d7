use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use clipvault_core::models::{CompleteUploadRequest, PrepareUploadRequest, PrepareUploadResponse};
use std::sync::Arc;
use uuid::Uuid;

/// Start a multipart upload and presign one URL per part
#[utoipa::path(
    post,
    path = "/api/videos/{id}/upload/init",
    tag = "uploads",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = PrepareUploadRequest,
    responses(
        (status = 201, description = "Upload session started", body = PrepareUploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File needs more parts than supported", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(video_id = %id, file_size = request.file_size))]
pub async fn prepare_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<PrepareUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = state
        .management
        .prepare_upload_session(id, request.file_size)
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Commit the multipart upload and hand the video to transcoding.
/// Repeating the call after success is a no-op.
#[utoipa::path(
    post,
    path = "/api/videos/{id}/upload/complete",
    tag = "uploads",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body = CompleteUploadRequest,
    responses(
        (status = 204, description = "Upload completed"),
        (status = 400, description = "Invalid part list", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 502, description = "Storage unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(video_id = %id, upload_id = %request.upload_id))]
pub async fn complete_upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<CompleteUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .management
        .complete_upload_session(id, &request.upload_id, &request.parts)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
