//! git::repository
//!
//! Lazily opened, memoized repository handle.
//!
//! A [`RepositoryResolver`] is created per command invocation with an explicit
//! base directory (never the process working directory read from the
//! environment) and, optionally, an explicit git directory. The first call to
//! [`RepositoryResolver::resolve`] opens the repository; later calls return
//! the same handle.
//!
//! # Example
//!
//! ```ignore
//! use logical_git::git::RepositoryResolver;
//!
//! let repo = RepositoryResolver::new(std::env::current_dir()?);
//! let git = repo.resolve()?;
//! let again = repo.resolve()?;
//! assert!(std::ptr::eq(git, again));
//! ```

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::interface::Git;

/// Errors from repository resolution.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("cannot find repository")]
    NotFound { searched: PathBuf },

    #[error("git directory cannot change once the repository is open")]
    AlreadyOpen,
}

/// Opens a repository on first use and hands out the same handle afterwards.
#[derive(Debug)]
pub struct RepositoryResolver {
    base: PathBuf,
    git_dir: Option<PathBuf>,
    handle: OnceCell<Git>,
}

impl RepositoryResolver {
    /// Search upward from `base` when resolved.
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            git_dir: None,
            handle: OnceCell::new(),
        }
    }

    /// Directory relative arguments resolve against.
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn git_dir(&self) -> Option<&Path> {
        self.git_dir.as_deref()
    }

    /// Open exactly this git directory instead of searching.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::AlreadyOpen`] once the handle has been built.
    pub fn set_git_dir(&mut self, git_dir: PathBuf) -> Result<(), RepositoryError> {
        if self.is_open() {
            return Err(RepositoryError::AlreadyOpen);
        }
        self.git_dir = Some(git_dir);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.handle.get().is_some()
    }

    /// The repository handle, opened on first call.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if there is no repository at the git
    /// directory, or at or above the base directory.
    pub fn resolve(&self) -> Result<&Git, RepositoryError> {
        if let Some(git) = self.handle.get() {
            return Ok(git);
        }
        let git = self.open()?;
        Ok(self.handle.get_or_init(|| git))
    }

    fn open(&self) -> Result<Git, RepositoryError> {
        match &self.git_dir {
            Some(dir) => Git::open_git_dir(dir).map_err(|_| RepositoryError::NotFound {
                searched: dir.clone(),
            }),
            None => Git::open(&self.base).map_err(|_| RepositoryError::NotFound {
                searched: self.base.clone(),
            }),
        }
    }
}
