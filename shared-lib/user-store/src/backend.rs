//! Storage backends.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use error::StoreError;
use tokio::sync::RwLock;

use crate::models::UserRecord;

/// Whole-set persistence of user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Read the full current set of users.
    async fn read_all(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Replace the full set of users.
    async fn write_all(&self, users: &[UserRecord]) -> Result<(), StoreError>;
}

/// JSON flat-file backend (`users.json`).
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next write is staged in.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl UserStore for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("User file {} missing, treating as empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::error!("Failed to read {}: {}", self.path.display(), e);
                return Err(e.into());
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            tracing::error!("Failed to parse {}: {}", self.path.display(), e);
            StoreError::from(e)
        })
    }

    async fn write_all(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Staged then renamed: a crash mid-write leaves the old file intact.
        let content = serde_json::to_string_pretty(users)?;
        let staging = self.staging_path();
        tokio::fs::write(&staging, content).await?;
        if let Err(e) = tokio::fs::rename(&staging, &self.path).await {
            tracing::error!("Failed to replace {}: {}", self.path.display(), e);
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        tracing::debug!("Wrote {} users to {}", users.len(), self.path.display());
        Ok(())
    }
}

/// In-memory backend for testing and development
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn read_all(&self) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn write_all(&self, users: &[UserRecord]) -> Result<(), StoreError> {
        *self.users.write().await = users.to_vec();
        Ok(())
    }
}
