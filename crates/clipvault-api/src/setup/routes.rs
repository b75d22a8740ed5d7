//! Route configuration and setup

mod health;

use crate::api_doc::ApiDoc;
use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Json, Router,
};
use clipvault_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Setup all application routes with CORS, tracing and body limits
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    // Server-level concurrency limit to protect against resource exhaustion under extreme load
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10_000)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    Ok(app_router(state)
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(cors))
}

/// Routes and per-request layers, without environment-specific CORS
pub fn app_router(state: Arc<AppState>) -> Router<()> {
    Router::new()
        .route("/health", get(health::liveness_check))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .route(
            "/api/videos",
            get(handlers::videos::list_videos).post(handlers::videos::create_video),
        )
        .route("/api/videos/search", get(handlers::videos::search_videos))
        .route("/api/videos/{id}", get(handlers::videos::get_video))
        .route(
            "/api/videos/{id}/visibility",
            patch(handlers::videos::update_visibility),
        )
        .route(
            "/api/videos/{id}/upload/init",
            post(handlers::video_upload::prepare_upload),
        )
        .route(
            "/api/videos/{id}/upload/complete",
            post(handlers::video_upload::complete_upload),
        )
        .route(
            "/api/videos/{id}/playback-info",
            get(handlers::videos::get_playback_info),
        )
        .route(
            "/api/streams/{hash}/{expires}/{id}",
            get(handlers::video_stream::stream_object),
        )
        .route(
            "/api/streams/{hash}/{expires}/{id}/{*path}",
            get(handlers::video_stream::stream_object),
        )
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::PATCH, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
