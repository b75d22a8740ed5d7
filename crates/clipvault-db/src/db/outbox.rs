//! Transactional outbox writer
//!
//! Domain events are stored in `video_outbox` in the same transaction as the aggregate.
//! A separate relay publishes rows and sets `published_at`; that relay is not part of
//! this service. Rows are delivered in `sequence` order, which is the order they were
//! appended. The row lock on the video keeps that order per aggregate.

use chrono::{DateTime, Utc};
use clipvault_core::{AppError, VideoEvent};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

pub const VIDEO_AGGREGATE_TYPE: &str = "video";

/// A row of the outbox table, ready to insert
#[derive(Debug, Clone)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub aggregate_type: &'static str,
    pub aggregate_id: Uuid,
    pub event_type: &'static str,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl OutboxEntry {
    pub fn from_event(event: &VideoEvent) -> Result<Self, AppError> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_type: VIDEO_AGGREGATE_TYPE,
            aggregate_id: event.video_id(),
            event_type: event.event_type(),
            payload: serde_json::to_value(event)?,
            occurred_at: event.occurred_at(),
        })
    }
}

/// Insert one outbox row using the caller's executor (normally an open transaction)
pub async fn insert_entry<'e, E>(executor: E, entry: &OutboxEntry) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO video_outbox (
            id, aggregate_type, aggregate_id, event_type, payload, occurred_at
        )
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(entry.id)
    .bind(entry.aggregate_type)
    .bind(entry.aggregate_id)
    .bind(entry.event_type)
    .bind(&entry.payload)
    .bind(entry.occurred_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// A stored outbox row
#[derive(Debug, Clone, FromRow)]
pub struct OutboxRecord {
    pub sequence: i64,
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Oldest unpublished rows, in insert order
pub async fn fetch_unpublished<'e, E>(
    executor: E,
    limit: i64,
) -> Result<Vec<OutboxRecord>, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let rows = sqlx::query_as::<_, OutboxRecord>(
        r#"
        SELECT sequence, id, aggregate_id, event_type, payload, occurred_at, published_at
        FROM video_outbox
        WHERE published_at IS NULL
        ORDER BY sequence
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Stamp rows as delivered; returns how many were still unpublished
pub async fn mark_published<'e, E>(executor: E, ids: &[Uuid]) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        r#"
        UPDATE video_outbox
        SET published_at = NOW()
        WHERE id = ANY($1) AND published_at IS NULL
        "#,
    )
    .bind(ids)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}
