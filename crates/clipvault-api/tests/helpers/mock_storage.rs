//! In-memory storage gateway that records every call.

use async_trait::async_trait;
use clipvault_core::PartInfo;
use clipvault_storage::{StorageError, StorageResult, VideoStorage};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageCall {
    StartUploadSession {
        key: String,
    },
    GenerateUploadPartUrl {
        key: String,
        session_id: String,
        part_number: i32,
    },
    CommitUploadSession {
        key: String,
        session_id: String,
        parts: Vec<PartInfo>,
    },
    GenerateTemporaryAccessUrl {
        key: String,
        expires_in: Duration,
    },
    DeleteSource {
        key: String,
    },
}

#[derive(Default)]
pub struct MockStorage {
    calls: Mutex<Vec<StorageCall>>,
    sessions: AtomicUsize,
    fail_start: AtomicBool,
    fail_part_url_at: Mutex<Option<i32>>,
    fail_commit: AtomicBool,
    fail_access_url: AtomicBool,
    fail_delete: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn commit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StorageCall::CommitUploadSession { .. }))
            .count()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StorageCall::DeleteSource { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    pub fn fail_part_url_at(&self, part_number: i32) {
        *self.fail_part_url_at.lock().unwrap() = Some(part_number);
    }

    pub fn fail_commit(&self) {
        self.fail_commit.store(true, Ordering::SeqCst);
    }

    pub fn fail_access_url(&self) {
        self.fail_access_url.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self) {
        self.fail_delete.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: StorageCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl VideoStorage for MockStorage {
    async fn start_upload_session(&self, key: &str) -> StorageResult<String> {
        self.record(StorageCall::StartUploadSession {
            key: key.to_string(),
        });
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(StorageError::SessionFailed("injected".to_string()));
        }
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("upload-{}", n))
    }

    async fn generate_upload_part_url(
        &self,
        key: &str,
        session_id: &str,
        part_number: i32,
    ) -> StorageResult<String> {
        self.record(StorageCall::GenerateUploadPartUrl {
            key: key.to_string(),
            session_id: session_id.to_string(),
            part_number,
        });
        if *self.fail_part_url_at.lock().unwrap() == Some(part_number) {
            return Err(StorageError::PresignFailed("injected".to_string()));
        }
        Ok(format!(
            "https://storage.test/{}?uploadId={}&partNumber={}",
            key, session_id, part_number
        ))
    }

    async fn commit_upload_session(
        &self,
        key: &str,
        session_id: &str,
        parts: &[PartInfo],
    ) -> StorageResult<()> {
        self.record(StorageCall::CommitUploadSession {
            key: key.to_string(),
            session_id: session_id.to_string(),
            parts: parts.to_vec(),
        });
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(StorageError::SessionFailed("injected".to_string()));
        }
        Ok(())
    }

    async fn generate_temporary_access_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.record(StorageCall::GenerateTemporaryAccessUrl {
            key: key.to_string(),
            expires_in,
        });
        if self.fail_access_url.load(Ordering::SeqCst) {
            return Err(StorageError::PresignFailed("injected".to_string()));
        }
        Ok(format!(
            "https://storage.test/{}?X-Amz-Expires={}",
            key,
            expires_in.as_secs()
        ))
    }

    async fn delete_source(&self, key: &str) -> StorageResult<()> {
        self.record(StorageCall::DeleteSource {
            key: key.to_string(),
        });
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("injected".to_string()));
        }
        Ok(())
    }
}
