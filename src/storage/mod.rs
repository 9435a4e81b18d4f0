//! Storage abstractions for the saved posting list.
//!
//! The saved state is the posting list of the last run that wrote it, used as
//! the baseline for the next diff. A run holds a [`StoreLock`] while it loads,
//! diffs and saves so two runs never diff against the same stale state.

pub mod local;

use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Posting;

// Re-export for convenience
pub use local::LocalStorage;

/// Guard for exclusive access to the saved state. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    held: Option<(PathBuf, File)>,
}

impl StoreLock {
    /// A lock that guards nothing, for stores without cross-process access.
    pub fn none() -> Self {
        Self { held: None }
    }

    /// A lock held through an OS advisory lock on an open file.
    ///
    /// The operating system drops the lock when the file is closed, including
    /// when the process dies, so the file itself may outlive the run.
    pub fn file(path: PathBuf, file: File) -> Self {
        Self {
            held: Some((path, file)),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.held.as_ref().map(|(path, _)| path.as_path())
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some((path, file)) = self.held.take() {
            if let Err(e) = file.unlock() {
                log::warn!("Failed to release lock {}: {}", path.display(), e);
            }
        }
    }
}

/// Trait for saved state backends.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Load the saved postings; empty when nothing was saved yet.
    async fn load(&self) -> Result<Vec<Posting>>;

    /// Replace the saved postings.
    async fn save(&self, postings: &[Posting]) -> Result<()>;

    /// Take exclusive access to the saved state for one run.
    async fn lock(&self) -> Result<StoreLock> {
        Ok(StoreLock::none())
    }

    /// Human-readable location, for logs.
    fn location(&self) -> String;
}
