//! Storage for rendered proposal files.
//!
//! - `ObjectStorage` - remote object store that can hand out signed URLs
//!   (`SupabaseStorage` in production).
//! - `LocalFileStore` - writes into the output directory and serves files
//!   through `/download/{filename}`.
//! - `StorageResolver` - tries the object store first and falls back to the
//!   local directory on any failure.

mod local;
mod supabase;

pub use local::LocalFileStore;
pub use supabase::{SupabaseConfig, SupabaseStorage};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const OBJECT_PREFIX: &str = "proposals";
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store request failed: {0}")]
    Request(String),
    #[error("object store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("object store response was malformed: {0}")]
    Malformed(String),
    #[error("failed to write local file: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote object store.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload_file(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// A URL for `key` that stops working after `expires_in`.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Where a stored file ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    ObjectStore,
    Local,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub location: StorageLocation,
}

pub fn object_key(filename: &str) -> String {
    format!("{}/{}", OBJECT_PREFIX, filename)
}

#[derive(Clone)]
pub struct StorageResolver {
    remote: Option<Arc<dyn ObjectStorage>>,
    local: LocalFileStore,
    signed_url_ttl: Duration,
}

impl StorageResolver {
    pub fn new(remote: Option<Arc<dyn ObjectStorage>>, local: LocalFileStore) -> Self {
        Self {
            remote,
            local,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
        }
    }

    pub fn with_signed_url_ttl(mut self, ttl: Duration) -> Self {
        self.signed_url_ttl = ttl;
        self
    }

    pub fn local(&self) -> &LocalFileStore {
        &self.local
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    async fn store_remote(
        &self,
        remote: &dyn ObjectStorage,
        bytes: &[u8],
        filename: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(filename);
        remote.upload_file(&key, bytes, PDF_CONTENT_TYPE).await?;
        remote.signed_url(&key, self.signed_url_ttl).await
    }

    /// Persist `bytes` and return a download URL. Object store failures are
    /// logged and absorbed; only a failed local write is an error.
    pub async fn store(&self, bytes: &[u8], filename: &str) -> Result<StoredFile, StorageError> {
        if let Some(remote) = &self.remote {
            match self.store_remote(remote.as_ref(), bytes, filename).await {
                Ok(url) => {
                    log::info!("Stored {} in object storage", filename);
                    return Ok(StoredFile {
                        url,
                        location: StorageLocation::ObjectStore,
                    });
                }
                Err(e) => {
                    log::error!(
                        "Object storage upload/sign failed for {}, saving locally: {}",
                        filename,
                        e
                    );
                }
            }
        }

        let url = self.local.save(filename, bytes).await?;
        log::info!("Stored {} in local output directory", filename);
        Ok(StoredFile {
            url,
            location: StorageLocation::Local,
        })
    }
}
