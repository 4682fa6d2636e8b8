//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module imports `git2`, and nothing
//! outside this module shells out to the git CLI.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening, memoized per invocation
//! - Ref and revision resolution, peeling to commits
//! - Tree, index and work tree content enumeration
//! - In-memory tree merges and conflict resolution
//! - Commit creation, HEAD and ref updates, checkout and reset
//! - Status and state detection
//!
//! # Invariants
//!
//! - Once opened, a repository handle's git directory never changes
//! - No other module calls git2 directly
//! - All operations return strong types (Oid, BranchName, RefName)
//!
//! # Example
//!
//! ```ignore
//! use logical_git::git::RepositoryResolver;
//!
//! let repo = RepositoryResolver::new(std::env::current_dir()?);
//! let git = repo.resolve()?;
//! let head = git.head_oid()?;
//! let files = git.tree_files(&head, &|path| path.ends_with(".ecore"))?;
//! ```

mod interface;
mod repository;

pub use interface::{
    CommitInfo, ConflictEntry, Git, GitError, GitState, ObjectKind, ObjectRef, RefEntry, TreeMerge,
    WorktreeStatus,
};
pub use repository::{RepositoryError, RepositoryResolver};

use crate::core::signal::Die;

impl From<GitError> for Die {
    fn from(err: GitError) -> Self {
        match err {
            GitError::WouldOverwrite { paths } => Die::error(format!(
                "Your local changes to the following files would be overwritten:\n{}\nPlease commit, stash or move them before you continue.",
                paths
                    .iter()
                    .map(|path| format!("\t{}", path))
                    .collect::<Vec<_>>()
                    .join("\n")
            )),
            err => Die::internal(err),
        }
    }
}
