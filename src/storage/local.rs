//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {storage_dir}/
//! ├── config.toml           # Watcher configuration
//! ├── jobs.json             # Saved postings (pretty JSON list)
//! ├── jobs.json.lock        # Advisory lock, holds the pid of the last run
//! └── scraper.log           # Append-only run log
//! ```
//!
//! Writes go to `jobs.json.tmp` first and are renamed into place, so an
//! interrupted write leaves the previous state readable.

use std::fs::TryLockError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Posting;
use crate::storage::{PostingStore, StoreLock};

/// Saved state kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Create a store backed by the given state file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path next to the state file with an extra suffix.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::store(parent, e))?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.sibling(".tmp");
        let mut file = tokio::fs::File::create(&tmp)
            .await
            .map_err(|e| AppError::store(&tmp, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| AppError::store(&tmp, e))?;
        file.sync_all().await.map_err(|e| AppError::store(&tmp, e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::store(&self.path, e))?;
        Ok(())
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::store(&self.path, e)),
        }
    }
}

#[async_trait]
impl PostingStore for LocalStorage {
    async fn load(&self) -> Result<Vec<Posting>> {
        match self.read_bytes().await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::store(&self.path, format!("corrupt saved state: {e}"))),
            None => {
                log::info!("No saved state at {}, starting empty", self.path.display());
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, postings: &[Posting]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(postings)?;
        self.write_bytes(&bytes).await?;
        log::info!("Saved {} postings to {}", postings.len(), self.path.display());
        Ok(())
    }

    async fn lock(&self) -> Result<StoreLock> {
        self.ensure_dir().await?;

        let lock_path = self.lock_path();
        let mut file = tokio::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .await
            .map_err(|e| AppError::store(&lock_path, e))?
            .into_std()
            .await;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                let mut holder = String::new();
                let _ = file.read_to_string(&mut holder);
                return Err(AppError::store(
                    &lock_path,
                    format!("another run (pid {}) holds the saved state", holder.trim()),
                ));
            }
            Err(TryLockError::Error(e)) => return Err(AppError::store(&lock_path, e)),
        }

        // Whatever a crashed run left behind is replaced by our pid.
        file.set_len(0)
            .and_then(|()| file.write_all(std::process::id().to_string().as_bytes()))
            .and_then(|()| file.flush())
            .map_err(|e| AppError::store(&lock_path, e))?;
        Ok(StoreLock::file(lock_path, file))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<Posting> {
        vec![
            Posting {
                department: Some("Faculty of Medicine".into()),
                advertised_date: Some("2026-10-01".into()),
                closing_date: Some("2026-10-15".into()),
                ..Posting::new("Clerk, Band Level 2", "https://www.mun.ca/careers/1")
            },
            Posting::new("Senior Analyst, Band Level 3", "https://www.mun.ca/careers/2"),
        ]
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("jobs.json"));
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("state").join("jobs.json"));

        storage.save(&sample()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), sample());
        assert!(!storage.sibling(".tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("jobs.json"));

        storage.save(&sample()).await.unwrap();
        storage.save(&sample()[1..]).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), sample()[1..].to_vec());
    }

    #[tokio::test]
    async fn test_corrupt_file_fails_loudly() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jobs.json");
        std::fs::write(&path, "[{\"title\": ").unwrap();

        let storage = LocalStorage::new(&path);
        assert!(matches!(storage.load().await, Err(AppError::Store { .. })));
    }

    #[tokio::test]
    async fn test_reads_older_schema_without_optional_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("jobs.json");
        std::fs::write(
            &path,
            r#"[{"title": "Clerk, Band Level 2", "link": "https://www.mun.ca/careers/1", "closing": "2026-10-15"}]"#,
        )
        .unwrap();

        let loaded = LocalStorage::new(&path).load().await.unwrap();
        assert_eq!(loaded[0].closing_date.as_deref(), Some("2026-10-15"));
        assert_eq!(loaded[0].department, None);
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_and_released_on_drop() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("jobs.json"));

        let lock = storage.lock().await.unwrap();
        assert_eq!(lock.path(), Some(storage.lock_path().as_path()));
        assert_eq!(
            std::fs::read_to_string(storage.lock_path()).unwrap(),
            std::process::id().to_string()
        );

        match storage.lock().await {
            Err(AppError::Store { message, .. }) => {
                assert!(message.contains(&std::process::id().to_string()))
            }
            other => panic!("expected the lock to be held, got {other:?}"),
        }

        drop(lock);
        assert!(storage.lock().await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_left_by_crashed_run_is_reclaimed() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("jobs.json"));
        std::fs::write(storage.lock_path(), "999999").unwrap();

        let lock = storage.lock().await.unwrap();
        assert_eq!(
            std::fs::read_to_string(storage.lock_path()).unwrap(),
            std::process::id().to_string()
        );
        drop(lock);

        // Repeated runs keep working with the file still in place.
        assert!(storage.lock_path().exists());
        assert!(storage.lock().await.is_ok());
    }
}
