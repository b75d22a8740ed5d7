//! In-memory video store and Unit of Work.
//!
//! Transactions stage writes and apply them on commit. One transaction runs at a time,
//! which mirrors the row lock the Postgres implementation takes.

use async_trait::async_trait;
use clipvault_core::{AppError, Video, VideoEvent, VideoStatus, Visibility};
use clipvault_db::{UnitOfWork, VideoStore, VideoTransaction};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryDb {
    videos: Mutex<HashMap<Uuid, Video>>,
    outbox: Mutex<Vec<VideoEvent>>,
    tx_lock: Arc<AsyncMutex<()>>,
    fail_save: AtomicBool,
    fail_commit: AtomicBool,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

impl MemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store a video directly, bypassing any transaction.
    pub fn put(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id(), video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn outbox(&self) -> Vec<VideoEvent> {
        self.outbox.lock().unwrap().clone()
    }

    /// Ready, public videos matching `filter`, newest first.
    fn playable(&self, limit: i64, filter: impl Fn(&Video) -> bool) -> Vec<Video> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.status() == VideoStatus::Ready && v.visibility() == Visibility::Public)
            .filter(|v| filter(v))
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        videos.truncate(limit.max(0) as usize);
        videos
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    pub fn fail_save(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    pub fn fail_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoStore for MemoryDb {
    async fn insert(&self, video: &Video) -> Result<(), AppError> {
        self.put(video.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn list_public(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        Ok(self.playable(limit, |_| true))
    }

    async fn find_by_tag(&self, tag: &str, limit: i64) -> Result<Vec<Video>, AppError> {
        Ok(self.playable(limit, |video| video.tags().iter().any(|t| t == tag)))
    }
}

/// Unit of Work over a shared `MemoryDb`
pub struct MemoryUnitOfWork {
    db: Arc<MemoryDb>,
}

impl MemoryUnitOfWork {
    pub fn new(db: Arc<MemoryDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn begin(&self) -> Result<Box<dyn VideoTransaction>, AppError> {
        let guard = self.db.tx_lock.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            db: self.db.clone(),
            _guard: guard,
            staged_videos: Vec::new(),
            staged_events: Vec::new(),
        }))
    }
}

pub struct MemoryTransaction {
    db: Arc<MemoryDb>,
    _guard: OwnedMutexGuard<()>,
    staged_videos: Vec<Video>,
    staged_events: Vec<VideoEvent>,
}

#[async_trait]
impl VideoTransaction for MemoryTransaction {
    async fn find_video(&mut self, id: Uuid) -> Result<Video, AppError> {
        if let Some(staged) = self.staged_videos.iter().rev().find(|v| v.id() == id) {
            return Ok(staged.clone());
        }
        self.db
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    async fn save_video(&mut self, video: &Video) -> Result<(), AppError> {
        if self.db.fail_save.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected save failure".to_string()));
        }
        self.staged_videos.push(video.clone());
        Ok(())
    }

    async fn append_events(&mut self, events: Vec<VideoEvent>) -> Result<(), AppError> {
        self.staged_events.extend(events);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        if self.db.fail_commit.load(Ordering::SeqCst) {
            return Err(AppError::Internal("injected commit failure".to_string()));
        }
        let this = *self;
        for video in this.staged_videos {
            this.db.put(video);
        }
        this.db.outbox.lock().unwrap().extend(this.staged_events);
        this.db.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.db.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
