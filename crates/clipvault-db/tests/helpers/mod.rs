//! Test helpers: a migrated Postgres in a throwaway container.
//!
//! Run from workspace root: `cargo test -p clipvault-db`. Needs a reachable Docker daemon;
//! without one each test logs that it was skipped and returns.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use clipvault_core::{Video, VideoStatus, Visibility};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;
use uuid::Uuid;

pub struct TestDb {
    pub pool: PgPool,
    _container: ContainerAsync<Postgres>,
}

/// Start Postgres and run the workspace migrations against it.
pub async fn setup_db() -> Option<TestDb> {
    let container = match Postgres::default().start().await {
        Ok(container) => container,
        Err(e) => {
            eprintln!("skipping Postgres test, Docker unavailable: {}", e);
            return None;
        }
    };

    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("postgres port");
    let connection_string = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&connection_string)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(TestDb {
        pool,
        _container: container,
    })
}

/// A persisted-looking video in any status, for listing and lock tests.
pub fn stored_video(
    status: VideoStatus,
    visibility: Visibility,
    tags: &[&str],
    created_at: DateTime<Utc>,
) -> Video {
    let id = Uuid::new_v4();
    let stream_key = match status {
        VideoStatus::Transcoding | VideoStatus::Ready => Some(format!("videos/{}/stream/", id)),
        _ => None,
    };
    let source_key = match status {
        VideoStatus::Initial => None,
        _ => Some(format!("videos/{}/source", id)),
    };

    Video::restore(
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
    )
}
