//! Playback access gate tests.
//!
//! Run with: `cargo test -p clipvault-api --test playback_test`

mod helpers;

use chrono::Utc;
use clipvault_core::constants::STREAM_URL_TTL;
use clipvault_core::{AppError, VideoStatus, Visibility};
use helpers::mock_storage::StorageCall;
use helpers::{setup, video_in};
use uuid::Uuid;

#[tokio::test]
async fn test_playback_info_for_ready_public_video() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Public);

    let info = ctx
        .state
        .viewing
        .get_playback_info(video.id())
        .await
        .unwrap();

    assert_eq!(info.mime_type, "application/x-mpegURL");

    let rest = info.playback_url.strip_prefix("/api/streams/").unwrap();
    let segments: Vec<&str> = rest.split('/').collect();
    assert_eq!(segments.len(), 4);
    assert_eq!(segments[2], video.id().to_string());
    assert_eq!(segments[3], "index.m3u8");

    let expires: i64 = segments[1].parse().unwrap();
    assert!(expires > Utc::now().timestamp());
    assert!(ctx
        .signer()
        .verify(segments[0], expires, video.id(), Utc::now())
        .is_ok());

    // Signing is local; storage is not consulted
    assert_eq!(ctx.storage.call_count(), 0);
}

#[tokio::test]
async fn test_not_ready_videos_are_rejected() {
    let ctx = setup();

    for status in [
        VideoStatus::Initial,
        VideoStatus::Uploaded,
        VideoStatus::Transcoding,
        VideoStatus::Failed,
    ] {
        for visibility in [Visibility::Public, Visibility::Private] {
            let video = video_in(&ctx.db, status, visibility);

            let info = ctx.state.viewing.get_playback_info(video.id()).await;
            assert!(matches!(info, Err(AppError::VideoNotReady)));

            let stream = ctx
                .state
                .viewing
                .get_video_stream(video.id(), "index.m3u8")
                .await;
            assert!(matches!(stream, Err(AppError::VideoNotReady)));
        }
    }

    assert_eq!(ctx.storage.call_count(), 0);
}

#[tokio::test]
async fn test_private_ready_video_is_forbidden() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Private);

    // Same answer on every call
    for _ in 0..3 {
        let info = ctx.state.viewing.get_playback_info(video.id()).await;
        assert!(matches!(info, Err(AppError::VideoForbidden)));

        let stream = ctx.state.viewing.get_video_stream(video.id(), "").await;
        assert!(matches!(stream, Err(AppError::VideoForbidden)));
    }

    assert_eq!(ctx.storage.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let ctx = setup();

    let info = ctx.state.viewing.get_playback_info(Uuid::new_v4()).await;
    assert!(matches!(info, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_traversal_rejected_before_storage() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Public);

    for path in ["../../etc/passwd", "/etc/passwd", "720p/../../../source"] {
        let result = ctx.state.viewing.get_video_stream(video.id(), path).await;
        assert!(
            matches!(result, Err(AppError::VideoForbidden)),
            "path {:?} was accepted",
            path
        );
    }

    assert_eq!(ctx.storage.call_count(), 0);
}

#[tokio::test]
async fn test_empty_path_resolves_to_playlist() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Public);

    let url = ctx
        .state
        .viewing
        .get_video_stream(video.id(), "")
        .await
        .unwrap();

    let key = format!("videos/{}/stream/index.m3u8", video.id());
    assert!(url.contains(&key));
    assert_eq!(
        ctx.storage.calls(),
        vec![StorageCall::GenerateTemporaryAccessUrl {
            key,
            expires_in: STREAM_URL_TTL,
        }]
    );
}

#[tokio::test]
async fn test_segment_path_joins_stream_prefix() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Public);

    ctx.state
        .viewing
        .get_video_stream(video.id(), "720p/./segment_003.ts")
        .await
        .unwrap();

    assert_eq!(
        ctx.storage.calls(),
        vec![StorageCall::GenerateTemporaryAccessUrl {
            key: format!("videos/{}/stream/720p/segment_003.ts", video.id()),
            expires_in: STREAM_URL_TTL,
        }]
    );
}

#[tokio::test]
async fn test_storage_failure_propagates() {
    let ctx = setup();
    let video = video_in(&ctx.db, VideoStatus::Ready, Visibility::Public);
    ctx.storage.fail_access_url();

    let result = ctx
        .state
        .viewing
        .get_video_stream(video.id(), "index.m3u8")
        .await;

    assert!(matches!(result, Err(AppError::Storage { .. })));
    // No retry at this layer
    assert_eq!(ctx.storage.call_count(), 1);
}
