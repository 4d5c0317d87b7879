use std::path::PathBuf;

use super::StorageError;
use crate::document::secure_filename;

/// Output directory for locally stored proposals.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    dir: PathBuf,
    base_url: String,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into(),
        }
    }

    /// Create the output directory if it is missing.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(secure_filename(filename))
    }

    pub fn download_url(&self, filename: &str) -> String {
        format!(
            "{}/download/{}",
            self.base_url.trim_end_matches('/'),
            secure_filename(filename)
        )
    }

    /// Write the file and return its download URL.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(filename), bytes).await?;
        Ok(self.download_url(filename))
    }
}
