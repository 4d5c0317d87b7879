#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auto_proposal_server::composer::{TextGenerationError, TextGenerator};
use auto_proposal_server::storage::{LocalFileStore, ObjectStorage, StorageError, StorageResolver};
use auto_proposal_server::AppState;
use tempfile::TempDir;
use tokio::sync::Mutex;

pub const BASE_URL: &str = "http://localhost:5000";

/// In-memory object store. When `fail` is set every call errors, which
/// exercises the local fallback.
#[derive(Default)]
pub struct MockObjectStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail: bool,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn has_file(&self, key: &str) -> bool {
        self.files.lock().await.contains_key(key)
    }

    pub async fn file_count(&self) -> usize {
        self.files.lock().await.len()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload_file(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.files.lock().await.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        if self.fail {
            return Err(StorageError::Request("connection refused".to_string()));
        }
        Ok(format!(
            "https://storage.test/signed/{}?expires_in={}",
            key,
            expires_in.as_secs()
        ))
    }
}

/// Text generator that always answers with a fixed body.
pub struct FixedTextGenerator(pub &'static str);

#[async_trait]
impl TextGenerator for FixedTextGenerator {
    async fn complete(&self, _prompt: &str) -> Result<String, TextGenerationError> {
        Ok(self.0.to_string())
    }
}

pub fn local_store(dir: &TempDir) -> LocalFileStore {
    LocalFileStore::new(dir.path(), BASE_URL)
}

/// State backed by a temporary output directory and no remote collaborators.
pub fn test_app_state(dir: &TempDir) -> AppState {
    AppState::new(StorageResolver::new(None, local_store(dir)))
}

pub fn test_app_state_with_remote(dir: &TempDir, remote: Arc<dyn ObjectStorage>) -> AppState {
    AppState::new(StorageResolver::new(Some(remote), local_store(dir)))
}
