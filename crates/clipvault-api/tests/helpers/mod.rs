//! Test helpers: build AppState and router over in-memory collaborators.
//!
//! Run from workspace root: `cargo test -p clipvault-api`.

#![allow(dead_code)]

pub mod memory_db;
pub mod mock_storage;

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use clipvault_api::setup::routes;
use clipvault_api::{AppState, PlaybackSigner};
use clipvault_core::{PartInfo, Video, VideoStatus, Visibility};
use memory_db::{MemoryDb, MemoryUnitOfWork};
use mock_storage::MockStorage;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SIGNING_SECRET: &str = "test-signing-secret-0123456789abcdef";

pub struct TestContext {
    pub storage: Arc<MockStorage>,
    pub db: Arc<MemoryDb>,
    pub state: Arc<AppState>,
}

impl TestContext {
    pub fn signer(&self) -> PlaybackSigner {
        test_signer()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(routes::app_router(self.state.clone())).expect("test server")
    }
}

pub fn test_signer() -> PlaybackSigner {
    PlaybackSigner::new(TEST_SIGNING_SECRET.as_bytes()).expect("signer")
}

pub fn setup() -> TestContext {
    let storage = Arc::new(MockStorage::new());
    let db = MemoryDb::new();
    let state = Arc::new(AppState::new(
        storage.clone(),
        Arc::new(MemoryUnitOfWork::new(db.clone())),
        db.clone(),
        test_signer(),
    ));

    TestContext { storage, db, state }
}

/// A freshly created video waiting for its upload.
pub fn initial_video(db: &MemoryDb) -> Video {
    let video = Video::new(Uuid::new_v4(), "Conference talk", "Recorded on stage");
    db.put(video.clone());
    video
}

/// A transcoded video with the given visibility.
pub fn video_in(db: &MemoryDb, status: VideoStatus, visibility: Visibility) -> Video {
    tagged_video_in(db, status, visibility, &[], Utc::now())
}

/// Like `video_in`, with tags and a fixed creation time for listing order.
pub fn tagged_video_in(
    db: &MemoryDb,
    status: VideoStatus,
    visibility: Visibility,
    tags: &[&str],
    created_at: DateTime<Utc>,
) -> Video {
    let id = Uuid::new_v4();
    let (source_key, stream_key) = match status {
        VideoStatus::Initial => (None, None),
        VideoStatus::Uploaded => (Some(format!("videos/{}/source", id)), None),
        _ => (
            Some(format!("videos/{}/source", id)),
            Some(format!("videos/{}/stream/", id)),
        ),
    };
    let video = Video::restore(
        id,
        "Conference talk".to_string(),
        String::new(),
        tags.iter().map(|t| t.to_string()).collect(),
        status,
        visibility,
        source_key,
        stream_key,
        created_at,
        created_at,
    );
    db.put(video.clone());
    video
}

pub fn parts(count: i32) -> Vec<PartInfo> {
    (1..=count)
        .map(|n| PartInfo {
            part_number: n,
            id: format!("\"etag-{}\"", n),
        })
        .collect()
}
