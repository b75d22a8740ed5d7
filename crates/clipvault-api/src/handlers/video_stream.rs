use crate::constants::{INTERNAL_PROXY_LOCATION, X_ACCEL_REDIRECT, X_S3_SIGNED_URL};
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use clipvault_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct StreamPath {
    pub hash: String,
    pub expires: i64,
    pub id: Uuid,
    /// Absent on the bare link, which serves the playlist
    #[serde(default)]
    pub path: String,
}

/// Redeem a signed playback path for one stream object.
///
/// The body is empty: the reverse proxy follows `X-Accel-Redirect` to its internal location
/// and fetches the presigned URL from `X-S3-Signed-URL`.
#[utoipa::path(
    get,
    path = "/api/streams/{hash}/{expires}/{id}/{path}",
    tag = "playback",
    params(
        ("hash" = String, Path, description = "Link signature"),
        ("expires" = i64, Path, description = "Link expiry (unix seconds)"),
        ("id" = Uuid, Path, description = "Video ID"),
        ("path" = String, Path, description = "Object path under the video's stream prefix")
    ),
    responses(
        (status = 200, description = "Redirect headers for the reverse proxy"),
        (status = 403, description = "Bad or expired signature, private video or forbidden path", body = ErrorResponse),
        (status = 409, description = "Video is not ready", body = ErrorResponse)
    )
)]
pub async fn stream_object(
    State(state): State<Arc<AppState>>,
    Path(params): Path<StreamPath>,
) -> Result<Response, HttpAppError> {
    state
        .viewing
        .signer()
        .verify(&params.hash, params.expires, params.id, Utc::now())?;

    let url = state
        .viewing
        .get_video_stream(params.id, &params.path)
        .await?;

    let signed_url = HeaderValue::from_str(&url)
        .map_err(|e| AppError::Internal(format!("Stream URL is not a valid header: {}", e)))?;

    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        X_ACCEL_REDIRECT,
        HeaderValue::from_static(INTERNAL_PROXY_LOCATION),
    );
    headers.insert(X_S3_SIGNED_URL, signed_url);
    Ok(response)
}
