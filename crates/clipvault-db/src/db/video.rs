use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clipvault_core::{AppError, Video};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

pub(crate) const VIDEO_COLUMNS: &str = r#"
    id, title, description, tags, status, visibility, source_key, stream_key,
    created_at, updated_at
"#;

/// Listings only show videos viewers can actually play
const PLAYABLE_FILTER: &str = "visibility = 'public' AND status = 'ready'";

/// Raw `videos` row; status and visibility are stored as lowercase text
#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: String,
    pub visibility: String,
    pub source_key: Option<String>,
    pub stream_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for Video {
    type Error = AppError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        Ok(Video::restore(
            row.id,
            row.title,
            row.description,
            row.tags,
            row.status.parse()?,
            row.visibility.parse()?,
            row.source_key,
            row.stream_key,
            row.created_at,
            row.updated_at,
        ))
    }
}

/// Read side of video persistence, outside any Unit of Work
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn insert(&self, video: &Video) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Ready, public videos, newest first
    async fn list_public(&self, limit: i64) -> Result<Vec<Video>, AppError>;

    /// Ready, public videos carrying `tag`, newest first
    async fn find_by_tag(&self, tag: &str, limit: i64) -> Result<Vec<Video>, AppError>;
}

/// Repository for the `videos` table
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for VideoRepository {
    #[tracing::instrument(skip(self, video), fields(video_id = %video.id()))]
    async fn insert(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, title, description, tags, status, visibility, source_key, stream_key,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
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
        .bind(video.created_at())
        .bind(video.updated_at())
        .execute(&self.pool)
        .await?;

        tracing::debug!("Video row inserted");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Video::try_from).transpose()
    }

    async fn list_public(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE {} ORDER BY created_at DESC, id LIMIT $1",
            VIDEO_COLUMNS, PLAYABLE_FILTER
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Video::try_from).collect()
    }

    async fn find_by_tag(&self, tag: &str, limit: i64) -> Result<Vec<Video>, AppError> {
        let tag = tag.trim().to_lowercase();
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {} FROM videos WHERE {} AND tags @> ARRAY[$1]::text[] \
             ORDER BY created_at DESC, id LIMIT $2",
            VIDEO_COLUMNS, PLAYABLE_FILTER
        ))
        .bind(tag)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Video::try_from).collect()
    }
}
