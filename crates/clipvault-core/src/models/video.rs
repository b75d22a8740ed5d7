use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::constants::MAX_TAGS;
use crate::error::AppError;

/// Lifecycle of a video. Moves strictly forward along
/// Initial -> Uploaded -> Transcoding -> Ready; Failed is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Initial,
    Uploaded,
    Transcoding,
    Ready,
    Failed,
}

impl Display for VideoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoStatus::Initial => write!(f, "initial"),
            VideoStatus::Uploaded => write!(f, "uploaded"),
            VideoStatus::Transcoding => write!(f, "transcoding"),
            VideoStatus::Ready => write!(f, "ready"),
            VideoStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for VideoStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(VideoStatus::Initial),
            "uploaded" => Ok(VideoStatus::Uploaded),
            "transcoding" => Ok(VideoStatus::Transcoding),
            "ready" => Ok(VideoStatus::Ready),
            "failed" => Ok(VideoStatus::Failed),
            other => Err(AppError::Internal(format!("Unknown video status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Visibility::Private => write!(f, "private"),
            Visibility::Public => write!(f, "public"),
        }
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "public" => Ok(Visibility::Public),
            other => Err(AppError::Internal(format!("Unknown visibility: {}", other))),
        }
    }
}

/// State-transition record queued on the aggregate until it is drained into the outbox.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum VideoEvent {
    #[serde(rename = "video.uploaded")]
    Uploaded {
        video_id: Uuid,
        source_key: String,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename = "video.transcoding_started")]
    TranscodingStarted {
        video_id: Uuid,
        source_key: String,
        stream_key: String,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename = "video.ready")]
    Ready {
        video_id: Uuid,
        stream_key: String,
        occurred_at: DateTime<Utc>,
    },
    #[serde(rename = "video.failed")]
    Failed {
        video_id: Uuid,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
}

impl VideoEvent {
    pub fn video_id(&self) -> Uuid {
        match self {
            VideoEvent::Uploaded { video_id, .. }
            | VideoEvent::TranscodingStarted { video_id, .. }
            | VideoEvent::Ready { video_id, .. }
            | VideoEvent::Failed { video_id, .. } => *video_id,
        }
    }

    /// Name written to the outbox `event_type` column; matches the serde tag.
    pub fn event_type(&self) -> &'static str {
        match self {
            VideoEvent::Uploaded { .. } => "video.uploaded",
            VideoEvent::TranscodingStarted { .. } => "video.transcoding_started",
            VideoEvent::Ready { .. } => "video.ready",
            VideoEvent::Failed { .. } => "video.failed",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VideoEvent::Uploaded { occurred_at, .. }
            | VideoEvent::TranscodingStarted { occurred_at, .. }
            | VideoEvent::Ready { occurred_at, .. }
            | VideoEvent::Failed { occurred_at, .. } => *occurred_at,
        }
    }
}

/// Trim and lowercase tags, dropping blanks and duplicates. First occurrence wins,
/// and at most `MAX_TAGS` are kept.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if tag.is_empty() || normalized.contains(&tag) {
            continue;
        }
        normalized.push(tag);
        if normalized.len() == MAX_TAGS {
            break;
        }
    }
    normalized
}

/// Video aggregate root.
///
/// Fields are private so every status change goes through a transition method that
/// validates the current state first. A rejected transition leaves the aggregate untouched.
#[derive(Debug, Clone)]
pub struct Video {
    id: Uuid,
    title: String,
    description: String,
    tags: Vec<String>,
    status: VideoStatus,
    visibility: Visibility,
    source_key: Option<String>,
    stream_key: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    pending_events: Vec<VideoEvent>,
}

impl Video {
    /// A freshly registered video: no source yet, not visible.
    pub fn new(id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: description.into(),
            tags: Vec::new(),
            status: VideoStatus::Initial,
            visibility: Visibility::Private,
            source_key: None,
            stream_key: None,
            created_at: now,
            updated_at: now,
            pending_events: Vec::new(),
        }
    }

    /// Attach search tags at creation time.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    /// Rebuild an aggregate from persisted state. The event queue starts empty.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        title: String,
        description: String,
        tags: Vec<String>,
        status: VideoStatus,
        visibility: Visibility,
        source_key: Option<String>,
        stream_key: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            tags,
            status,
            visibility,
            source_key,
            stream_key,
            created_at,
            updated_at,
            pending_events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn status(&self) -> VideoStatus {
        self.status
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn source_key(&self) -> Option<&str> {
        self.source_key.as_deref()
    }

    pub fn stream_key(&self) -> Option<&str> {
        self.stream_key.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn pending_events(&self) -> &[VideoEvent] {
        &self.pending_events
    }

    fn ensure_status(&self, expected: &[VideoStatus], to: VideoStatus) -> Result<(), AppError> {
        if expected.contains(&self.status) {
            Ok(())
        } else {
            Err(AppError::IllegalTransition {
                from: self.status,
                to,
            })
        }
    }

    fn record(&mut self, event: VideoEvent) {
        self.updated_at = event.occurred_at();
        self.pending_events.push(event);
    }

    /// Initial -> Uploaded. The source key only enters domain state here, once the
    /// multipart upload has been committed at storage.
    pub fn mark_uploaded(&mut self, source_key: impl Into<String>) -> Result<(), AppError> {
        self.ensure_status(&[VideoStatus::Initial], VideoStatus::Uploaded)?;

        let source_key = source_key.into();
        self.status = VideoStatus::Uploaded;
        self.source_key = Some(source_key.clone());
        self.record(VideoEvent::Uploaded {
            video_id: self.id,
            source_key,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Uploaded -> Transcoding. Renditions will be written under `stream_key`.
    pub fn start_transcoding(&mut self, stream_key: impl Into<String>) -> Result<(), AppError> {
        self.ensure_status(&[VideoStatus::Uploaded], VideoStatus::Transcoding)?;

        let stream_key = stream_key.into();
        let source_key = self.source_key.clone().unwrap_or_default();
        self.status = VideoStatus::Transcoding;
        self.stream_key = Some(stream_key.clone());
        self.record(VideoEvent::TranscodingStarted {
            video_id: self.id,
            source_key,
            stream_key,
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Transcoding -> Ready.
    pub fn mark_ready(&mut self) -> Result<(), AppError> {
        self.ensure_status(&[VideoStatus::Transcoding], VideoStatus::Ready)?;

        self.status = VideoStatus::Ready;
        self.record(VideoEvent::Ready {
            video_id: self.id,
            stream_key: self.stream_key.clone().unwrap_or_default(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Uploaded | Transcoding -> Failed.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), AppError> {
        self.ensure_status(
            &[VideoStatus::Uploaded, VideoStatus::Transcoding],
            VideoStatus::Failed,
        )?;

        self.status = VideoStatus::Failed;
        self.record(VideoEvent::Failed {
            video_id: self.id,
            reason: reason.into(),
            occurred_at: Utc::now(),
        });
        Ok(())
    }

    /// Visibility is independent of the lifecycle and emits no event.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        if self.visibility != visibility {
            self.visibility = visibility;
            self.updated_at = Utc::now();
        }
    }

    /// Drain the pending-event queue. Call only inside the transaction that persists
    /// this aggregate, so events are never observed without the matching state change.
    pub fn pull_events(&mut self) -> Vec<VideoEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

/// Public view of a video.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: VideoStatus,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Video> for VideoResponse {
    fn from(video: &Video) -> Self {
        VideoResponse {
            id: video.id(),
            title: video.title().to_string(),
            description: video.description().to_string(),
            tags: video.tags().to_vec(),
            status: video.status(),
            visibility: video.visibility(),
            created_at: video.created_at(),
            updated_at: video.updated_at(),
        }
    }
}
