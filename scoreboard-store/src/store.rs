//! Whole-document persistence.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::document::LeaderboardDocument;
use crate::error::StoreError;

/// Reads and writes the complete leaderboard document.
///
/// Implementations make no attempt to coordinate concurrent callers; the
/// owner (the task queue worker) must be the only one calling these.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create an empty document if none exists yet.
    async fn ensure_exists(&self) -> Result<(), StoreError>;

    /// Read and parse the full document.
    async fn load(&self) -> Result<LeaderboardDocument, StoreError>;

    /// Replace the stored document with `document`.
    async fn save(&self, document: &LeaderboardDocument) -> Result<(), StoreError>;
}

/// A leaderboard kept as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next document is staged in before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = OsString::from(".");
        name.push(self.path.file_name().unwrap_or_default());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn ensure_exists(&self) -> Result<(), StoreError> {
        let exists = fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        if !exists {
            tracing::info!(path = %self.path.display(), "creating empty leaderboard document");
            self.save(&LeaderboardDocument::default()).await?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<LeaderboardDocument, StoreError> {
        // Bytes, not a string: invalid UTF-8 is bad content, not an I/O failure.
        let raw = fs::read(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, document: &LeaderboardDocument) -> Result<(), StoreError> {
        let content = document.to_pretty_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        // Write-then-rename so a failed write never leaves a half document behind.
        let staging = self.staging_path();
        fs::write(&staging, content.as_bytes())
            .await
            .map_err(|e| StoreError::io(&staging, e))?;
        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::io(&self.path, e));
        }

        tracing::debug!(
            path = %self.path.display(),
            entries = document.scores.len(),
            "leaderboard document saved"
        );
        Ok(())
    }
}
