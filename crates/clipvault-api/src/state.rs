//! Application state shared by all handlers.

use crate::services::{PlaybackSigner, VideoManagementService, VideoViewingService};
use clipvault_db::{UnitOfWork, VideoStore};
use clipvault_storage::VideoStorage;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub management: VideoManagementService,
    pub viewing: VideoViewingService,
}

impl AppState {
    /// Wire the services from their collaborators. Production passes the Postgres and S3
    /// implementations; integration tests pass in-memory ones.
    pub fn new(
        storage: Arc<dyn VideoStorage>,
        uow: Arc<dyn UnitOfWork>,
        videos: Arc<dyn VideoStore>,
        signer: PlaybackSigner,
    ) -> Self {
        Self {
            management: VideoManagementService::new(storage.clone(), uow, videos.clone()),
            viewing: VideoViewingService::new(videos, storage, signer),
        }
    }
}
