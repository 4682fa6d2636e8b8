//! core::ops::lock
//!
//! Exclusive repository lock for mutating logical commands.
//!
//! The lock lives at `<common_dir>/logical/lock`, so it is shared by every
//! worktree of a repository. Acquisition is non-blocking and the lock is
//! released when the guard is dropped.
//!
//! # Example
//!
//! ```ignore
//! let lock = RepoLock::acquire(&paths)?;
//! // ... merge, cherry-pick or rebase ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::LogicalPaths;
use crate::core::signal::Die;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("repository is locked by another logical command")]
    AlreadyLocked,

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

impl From<LockError> for Die {
    fn from(err: LockError) -> Self {
        Die::fatal(err.to_string())
    }
}

/// An exclusive lock on the repository, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: File,
}

impl RepoLock {
    /// Attempt to acquire the repository lock.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &LogicalPaths) -> Result<Self, LockError> {
        let dir = paths.repo_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { path, file }),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(LockError::AlreadyLocked),
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
