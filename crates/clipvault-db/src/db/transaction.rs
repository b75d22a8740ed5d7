//! Unit of Work for the video aggregate
//!
//! A Unit of Work groups one load of the aggregate, its state change and the outbox
//! append into a single atomic commit. The contract is object-safe so services can hold
//! an `Arc<dyn UnitOfWork>` and tests can swap in an in-memory implementation.

use async_trait::async_trait;
use clipvault_core::{AppError, Video, VideoEvent};
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

use super::outbox::{insert_entry, OutboxEntry};
use super::video::{VideoRow, VIDEO_COLUMNS};

/// Repository handle bound to one open transaction
#[async_trait]
pub trait VideoTransaction: Send {
    /// Load the aggregate, locking it for the rest of the transaction.
    /// Missing videos are `AppError::NotFound`.
    async fn find_video(&mut self, id: Uuid) -> Result<Video, AppError>;

    async fn save_video(&mut self, video: &Video) -> Result<(), AppError>;

    /// Stage events for the outbox; they become visible only on commit.
    async fn append_events(&mut self, events: Vec<VideoEvent>) -> Result<(), AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait UnitOfWork: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn VideoTransaction>, AppError>;
}

pub type TransactionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'a>>;

/// Execute a closure within a Unit of Work
///
/// Begins a transaction, runs the closure with the transaction handle, and commits if
/// it succeeds or rolls back if it fails. A failed rollback is logged; the closure's
/// error is what the caller sees.
///
/// # Example
///
/// ```ignore
/// use clipvault_db::with_transaction;
///
/// with_transaction(uow.as_ref(), |tx| {
///     Box::pin(async move {
///         let mut video = tx.find_video(video_id).await?;
///         video.set_visibility(Visibility::Public);
///         tx.save_video(&video).await
///     })
/// })
/// .await?;
/// ```
pub async fn with_transaction<T, F>(uow: &dyn UnitOfWork, f: F) -> Result<T, AppError>
where
    T: Send,
    F: for<'a> FnOnce(&'a mut dyn VideoTransaction) -> TransactionFuture<'a, T> + Send,
{
    let mut tx = uow.begin().await?;

    match f(&mut *tx).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(
                    error = %rollback_err,
                    original_error = %e,
                    "Failed to roll back transaction"
                );
            }
            Err(e)
        }
    }
}

/// Postgres Unit of Work
#[derive(Clone)]
pub struct PgUnitOfWork {
    pool: PgPool,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn VideoTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgVideoTransaction { tx }))
    }
}

pub struct PgVideoTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VideoTransaction for PgVideoTransaction {
    async fn find_video(&mut self, id: Uuid) -> Result<Video, AppError> {
        // Row lock serializes concurrent completions of the same video
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE id = $1 FOR UPDATE",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => Video::try_from(row),
            None => Err(AppError::NotFound(format!("Video {} not found", id))),
        }
    }

    async fn save_video(&mut self, video: &Video) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET title = $2, description = $3, tags = $4, status = $5, visibility = $6,
                source_key = $7, stream_key = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(video.id())
        .bind(video.title())
        .bind(video.description())
        .bind(video.tags())
        .bind(video.status().to_string())
        .bind(video.visibility().to_string())
        .bind(video.source_key())
        .bind(video.stream_key())
        .bind(video.updated_at())
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Video {} not found", video.id())));
        }

        Ok(())
    }

    async fn append_events(&mut self, events: Vec<VideoEvent>) -> Result<(), AppError> {
        for event in &events {
            let entry = OutboxEntry::from_event(event)?;
            insert_entry(&mut *self.tx, &entry).await?;
        }

        if !events.is_empty() {
            tracing::debug!(event_count = events.len(), "Outbox events staged");
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
