//! core::paths
//!
//! Centralized path routing for on-disk state kept inside the git directory.
//!
//! # Storage Layout
//!
//! Repository-scoped data lives under `<common_dir>/logical/`:
//! - `config.toml` - Repository configuration
//! - `lock` - Exclusive lock file held by mutating commands
//!
//! Worktree-scoped data lives under `<git_dir>/logical/`, because it
//! describes the state of one worktree's HEAD:
//! - `sequencer.json` - An interrupted cherry-pick or rebase
//!
//! # Example
//!
//! ```
//! use logical_git::core::paths::LogicalPaths;
//! use std::path::PathBuf;
//!
//! let paths = LogicalPaths::new(
//!     PathBuf::from("/repo/.git/worktrees/feature"),
//!     PathBuf::from("/repo/.git"),
//! );
//!
//! assert_eq!(paths.config_path(), PathBuf::from("/repo/.git/logical/config.toml"));
//! assert_eq!(
//!     paths.sequencer_path(),
//!     PathBuf::from("/repo/.git/worktrees/feature/logical/sequencer.json")
//! );
//! ```

use std::path::{Path, PathBuf};

/// Paths of the files this tool keeps inside a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalPaths {
    /// Per-worktree git directory. Equals `common_dir` for normal repositories.
    pub git_dir: PathBuf,
    /// Shared git directory (refs, objects, config).
    pub common_dir: PathBuf,
}

impl LogicalPaths {
    pub fn new(git_dir: PathBuf, common_dir: PathBuf) -> Self {
        Self {
            git_dir,
            common_dir,
        }
    }

    /// `<common_dir>/logical`.
    pub fn repo_dir(&self) -> PathBuf {
        self.common_dir.join("logical")
    }

    /// `<git_dir>/logical`.
    pub fn worktree_dir(&self) -> PathBuf {
        self.git_dir.join("logical")
    }

    pub fn config_path(&self) -> PathBuf {
        self.repo_dir().join("config.toml")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.repo_dir().join("lock")
    }

    pub fn sequencer_path(&self) -> PathBuf {
        self.worktree_dir().join("sequencer.json")
    }

    /// A state file git itself reads, such as `MERGE_HEAD`.
    pub fn git_state_file(&self, name: &str) -> PathBuf {
        self.git_dir.join(name)
    }

    pub fn is_worktree(&self) -> bool {
        self.git_dir != self.common_dir
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }
}
