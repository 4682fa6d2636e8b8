//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to all Git operations. All
//! repository reads and writes flow through [`Git`], which returns strong
//! types and normalizes errors into typed failure categories.
//!
//! # Error Handling
//!
//! - [`GitError::NotARepo`]: No repository at or above the path
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::CasFailed`]: Compare-and-swap precondition failed
//! - [`GitError::BareRepo`]: A work tree was needed but there is none
//!
//! # Example
//!
//! ```ignore
//! use logical_git::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.head_oid()?;
//! println!("HEAD is at {}", head.short(7));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::paths::LogicalPaths;
use crate::core::types::{Oid, RefName, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository has no work tree")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Compare-and-swap precondition failed.
    #[error("CAS failed for {refname}: expected {expected}, found {actual}")]
    CasFailed {
        refname: String,
        expected: String,
        actual: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound { oid: String },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid { oid: String },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName { message: String },

    /// Work tree file could not be read or written.
    #[error("cannot access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A checkout would overwrite work tree content git does not track
    /// or that differs from HEAD.
    #[error("checkout would overwrite: {}", paths.join(", "))]
    WouldOverwrite { paths: Vec<String> },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal { message: String },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidRefName(msg) | TypeError::InvalidBranchName(msg) => {
                GitError::InvalidRefName { message: msg }
            }
        }
    }
}

/// State of in-progress Git operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitState {
    Clean,
    Rebase,
    Merge,
    CherryPick,
    Revert,
    Bisect,
    ApplyMailbox,
}

impl GitState {
    /// Check if any operation is in progress.
    ///
    /// ```
    /// use logical_git::git::GitState;
    ///
    /// assert!(!GitState::Clean.is_in_progress());
    /// assert!(GitState::Merge.is_in_progress());
    /// ```
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, GitState::Clean)
    }

    pub fn description(&self) -> &'static str {
        match self {
            GitState::Clean => "clean",
            GitState::Rebase => "rebase",
            GitState::Merge => "merge",
            GitState::CherryPick => "cherry-pick",
            GitState::Revert => "revert",
            GitState::Bisect => "bisect",
            GitState::ApplyMailbox => "apply-mailbox",
        }
    }
}

impl std::fmt::Display for GitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Kind of a Git object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
    Other,
}

impl ObjectKind {
    fn from_git2(kind: Option<git2::ObjectType>) -> Self {
        match kind {
            Some(git2::ObjectType::Commit) => ObjectKind::Commit,
            Some(git2::ObjectType::Tree) => ObjectKind::Tree,
            Some(git2::ObjectType::Blob) => ObjectKind::Blob,
            Some(git2::ObjectType::Tag) => ObjectKind::Tag,
            _ => ObjectKind::Other,
        }
    }
}

/// An object found by name, after peeling tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub oid: Oid,
    pub kind: ObjectKind,
}

/// A reference found by (possibly abbreviated) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    /// The full ref name
    pub name: RefName,
    /// What the ref points to, tags peeled
    pub target: ObjectRef,
}

/// Summary of working tree status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files (if requested)
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Untracked files do not make a work tree dirty.
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && !self.has_conflicts
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub author_time: chrono::DateTime<chrono::Utc>,
    pub parents: Vec<Oid>,
}

/// One conflicted path, with the blob of each stage that exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictEntry {
    pub path: String,
    pub ancestor: Option<Oid>,
    pub ours: Option<Oid>,
    pub theirs: Option<Oid>,
}

/// The in-memory result of merging trees, possibly with conflicts.
///
/// Produced by [`Git::merge_commits`] and [`Git::cherry_pick`]; conflicts are
/// resolved with [`Git::resolve_conflict`] before the result is committed or
/// written to the work tree.
pub struct TreeMerge {
    index: git2::Index,
}

impl std::fmt::Debug for TreeMerge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeMerge")
            .field("entries", &self.index.len())
            .field("has_conflicts", &self.index.has_conflicts())
            .finish()
    }
}

impl TreeMerge {
    pub fn has_conflicts(&self) -> bool {
        self.index.has_conflicts()
    }

    /// Conflicted paths, sorted.
    pub fn conflicts(&self) -> Result<Vec<ConflictEntry>, GitError> {
        conflict_entries(&self.index)
    }
}

fn entry_path(entry: &git2::IndexEntry) -> String {
    String::from_utf8_lossy(&entry.path).into_owned()
}

fn to_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(GitError::from)
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

fn conflict_entries(index: &git2::Index) -> Result<Vec<ConflictEntry>, GitError> {
    let mut result = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        let path = [&conflict.our, &conflict.their, &conflict.ancestor]
            .into_iter()
            .flatten()
            .map(entry_path)
            .next()
            .unwrap_or_default();
        let stage = |entry: &Option<git2::IndexEntry>| -> Result<Option<Oid>, GitError> {
            entry.as_ref().map(|e| to_oid(e.id)).transpose()
        };
        result.push(ConflictEntry {
            ancestor: stage(&conflict.ancestor)?,
            ours: stage(&conflict.our)?,
            theirs: stage(&conflict.their)?,
            path,
        });
    }
    result.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(result)
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`.
pub struct Git {
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open the repository containing `path`, searching upward.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Open the repository whose git directory is exactly `git_dir`.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `git_dir` is not a git directory
    pub fn open_git_dir(git_dir: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(git_dir).map_err(|_| GitError::NotARepo {
            path: git_dir.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Where this tool keeps its own files for this repository.
    pub fn paths(&self) -> LogicalPaths {
        LogicalPaths::new(
            self.repo.path().to_path_buf(),
            self.repo.commondir().to_path_buf(),
        )
    }

    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// The work tree root.
    ///
    /// # Errors
    ///
    /// - [`GitError::BareRepo`] for bare repositories
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    // =========================================================================
    // State Detection
    // =========================================================================

    /// Get the current Git state (rebase, merge, etc.).
    pub fn state(&self) -> GitState {
        match self.repo.state() {
            git2::RepositoryState::Clean => GitState::Clean,
            git2::RepositoryState::Rebase
            | git2::RepositoryState::RebaseInteractive
            | git2::RepositoryState::RebaseMerge => GitState::Rebase,
            git2::RepositoryState::Merge => GitState::Merge,
            git2::RepositoryState::CherryPick | git2::RepositoryState::CherryPickSequence => {
                GitState::CherryPick
            }
            git2::RepositoryState::Revert | git2::RepositoryState::RevertSequence => {
                GitState::Revert
            }
            git2::RepositoryState::Bisect => GitState::Bisect,
            git2::RepositoryState::ApplyMailbox | git2::RepositoryState::ApplyMailboxOrRebase => {
                GitState::ApplyMailbox
            }
        }
    }

    /// Get working tree status summary.
    pub fn worktree_status(&self, include_untracked: bool) -> Result<WorktreeStatus, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(include_untracked)
            .include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }
            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }
            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }
            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// Check if working tree is clean (no staged or unstaged changes).
    pub fn is_worktree_clean(&self) -> Result<bool, GitError> {
        Ok(self.worktree_status(false)?.is_clean())
    }

    // =========================================================================
    // Ref and Revision Resolution
    // =========================================================================

    /// Look a reference up by full or short name (`main`, `v1.0`, `HEAD`).
    ///
    /// Returns `Ok(None)` if no such reference exists or it cannot be peeled
    /// (an unborn HEAD, for instance).
    pub fn find_ref(&self, name: &str) -> Result<Option<RefEntry>, GitError> {
        let reference = match self.repo.resolve_reference_from_short_name(name) {
            Ok(r) => r,
            Err(e) if e.class() == git2::ErrorClass::Os => return Err(e.into()),
            Err(_) => return Ok(None),
        };
        let Some(full_name) = reference.name() else {
            return Ok(None);
        };
        let full_name = RefName::new(full_name)?;

        let object = match reference.peel(git2::ObjectType::Any) {
            Ok(o) => o,
            Err(_) => return Ok(None),
        };

        Ok(Some(RefEntry {
            name: full_name,
            target: ObjectRef {
                oid: to_oid(object.id())?,
                kind: ObjectKind::from_git2(object.kind()),
            },
        }))
    }

    /// Resolve a revision expression (`HEAD~2`, `abc1234`, `main^{tree}`).
    ///
    /// Returns `Ok(None)` if the expression does not name an object.
    pub fn revparse(&self, expr: &str) -> Result<Option<ObjectRef>, GitError> {
        match self.repo.revparse_single(expr) {
            Ok(object) => Ok(Some(ObjectRef {
                oid: to_oid(object.id())?,
                kind: ObjectKind::from_git2(object.kind()),
            })),
            Err(e) if e.class() == git2::ErrorClass::Os => Err(e.into()),
            Err(_) => Ok(None),
        }
    }

    /// Peel an object to the commit it designates.
    ///
    /// Returns `Ok(None)` if the object is not (and does not point to) a commit.
    pub fn peel_to_commit(&self, oid: &Oid) -> Result<Option<Oid>, GitError> {
        let object = self
            .repo
            .find_object(to_git2(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        match object.peel_to_commit() {
            Ok(commit) => Ok(Some(to_oid(commit.id())?)),
            Err(_) => Ok(None),
        }
    }

    /// Resolve a full ref name to the commit it points to.
    pub fn resolve_ref(&self, refname: &str) -> Result<Oid, GitError> {
        let reference = self
            .repo
            .find_reference(refname)
            .map_err(|e| GitError::from_git2(e, refname))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, refname))?;
        to_oid(commit.id())
    }

    /// Get HEAD commit OID.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        to_oid(commit.id())
    }

    /// The branch ref HEAD is attached to, `None` when detached or unborn.
    pub fn head_ref(&self) -> Result<Option<RefName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if !head.is_branch() {
            return Ok(None);
        }
        match head.name() {
            Some(name) => Ok(Some(RefName::new(name)?)),
            None => Ok(None),
        }
    }

    /// The configured upstream ref of a local branch, if any.
    pub fn upstream_of(&self, branch: &RefName) -> Result<Option<RefName>, GitError> {
        match self.repo.branch_upstream_name(branch.as_str()) {
            Ok(buf) => match buf.as_str() {
                Some(name) => Ok(Some(RefName::new(name)?)),
                None => Ok(None),
            },
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, branch.as_str())),
        }
    }

    // =========================================================================
    // Ref Updates
    // =========================================================================

    /// Update a ref with compare-and-swap semantics.
    ///
    /// The update only succeeds if the ref's current value matches
    /// `expected_old`; `None` means the ref must not exist.
    pub fn update_ref_cas(
        &self,
        refname: &str,
        new_oid: &Oid,
        expected_old: Option<&Oid>,
        message: &str,
    ) -> Result<(), GitError> {
        let current = match self.repo.find_reference(refname) {
            Ok(reference) => reference.target().map(|oid| oid.to_string()),
            Err(e) if e.code() == git2::ErrorCode::NotFound => None,
            Err(e) => return Err(GitError::from_git2(e, refname)),
        };

        let mismatch = match (expected_old, current.as_deref()) {
            (Some(expected), Some(actual)) => expected.as_str() != actual,
            (None, None) => false,
            _ => true,
        };
        if mismatch {
            return Err(GitError::CasFailed {
                refname: refname.to_string(),
                expected: expected_old.map_or("<none>".to_string(), Oid::to_string),
                actual: current.unwrap_or_else(|| "<none>".to_string()),
            });
        }

        self.repo
            .reference(refname, to_git2(new_oid)?, true, message)
            .map_err(|e| GitError::from_git2(e, refname))?;
        Ok(())
    }

    /// Move HEAD to `oid`: the attached branch moves, or a detached HEAD moves.
    pub fn update_head(&self, oid: &Oid, message: &str) -> Result<(), GitError> {
        match self.head_ref()? {
            Some(refname) => {
                self.repo
                    .reference(refname.as_str(), to_git2(oid)?, true, message)
                    .map_err(|e| GitError::from_git2(e, refname.as_str()))?;
            }
            None => self.repo.set_head_detached(to_git2(oid)?)?,
        }
        Ok(())
    }

    /// Point HEAD directly at a commit.
    pub fn detach_head(&self, oid: &Oid) -> Result<(), GitError> {
        self.repo.set_head_detached(to_git2(oid)?)?;
        Ok(())
    }

    /// Attach HEAD to a branch ref.
    pub fn attach_head(&self, refname: &RefName) -> Result<(), GitError> {
        self.repo
            .set_head(refname.as_str())
            .map_err(|e| GitError::from_git2(e, refname.as_str()))?;
        Ok(())
    }

    // =========================================================================
    // Ancestry Queries
    // =========================================================================

    /// Find the merge base of two commits, `None` if unrelated.
    pub fn merge_base(&self, oid1: &Oid, oid2: &Oid) -> Result<Option<Oid>, GitError> {
        match self.repo.merge_base(to_git2(oid1)?, to_git2(oid2)?) {
            Ok(oid) => Ok(Some(to_oid(oid)?)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if `ancestor` is an ancestor of `descendant` (or equal to it).
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self
            .repo
            .graph_descendant_of(to_git2(descendant)?, to_git2(ancestor)?)?)
    }

    /// Non-merge commits reachable from `tip` but not from `base`, oldest first.
    pub fn commits_between(&self, base: &Oid, tip: &Oid) -> Result<Vec<Oid>, GitError> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)?;
        revwalk.push(to_git2(tip)?)?;
        revwalk.hide(to_git2(base)?)?;

        let mut result = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            if self.repo.find_commit(oid)?.parent_count() > 1 {
                continue;
            }
            result.push(to_oid(oid)?);
        }
        Ok(result)
    }

    // =========================================================================
    // Commit and Blob Information
    // =========================================================================

    /// Get information about a commit.
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        let parents = commit
            .parent_ids()
            .map(to_oid)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
            parents,
        })
    }

    /// The tree id of a commit.
    pub fn commit_tree(&self, oid: &Oid) -> Result<Oid, GitError> {
        let commit = self
            .repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        to_oid(commit.tree_id())
    }

    /// Read a blob by OID.
    pub fn read_blob(&self, oid: &Oid) -> Result<Vec<u8>, GitError> {
        let blob = self
            .repo
            .find_blob(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        Ok(blob.content().to_vec())
    }

    // =========================================================================
    // Content Enumeration
    // =========================================================================

    /// Every file of a commit's tree accepted by `select`, with its content.
    pub fn tree_files(
        &self,
        commit: &Oid,
        select: &dyn Fn(&str) -> bool,
    ) -> Result<BTreeMap<String, Vec<u8>>, GitError> {
        let tree = self
            .repo
            .find_commit(to_git2(commit)?)
            .map_err(|e| GitError::from_git2(e, commit.as_str()))?
            .tree()?;

        let mut blobs = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let path = format!("{}{}", root, name);
                    if select(&path) {
                        blobs.push((path, entry.id()));
                    }
                }
            }
            git2::TreeWalkResult::Ok
        })?;

        let mut files = BTreeMap::new();
        for (path, oid) in blobs {
            let blob = self.repo.find_blob(oid)?;
            files.insert(path, blob.content().to_vec());
        }
        Ok(files)
    }

    /// Every tracked or untracked (not ignored) work tree file accepted by
    /// `select`, with its current content.
    pub fn worktree_files(
        &self,
        select: &dyn Fn(&str) -> bool,
    ) -> Result<BTreeMap<String, Vec<u8>>, GitError> {
        let work_dir = self.work_dir()?;

        let mut candidates = BTreeSet::new();
        for entry in self.repo.index()?.iter() {
            candidates.insert(entry_path(&entry));
        }

        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        for entry in self.repo.statuses(Some(&mut opts))?.iter() {
            if entry.status().is_wt_new() {
                if let Some(path) = entry.path() {
                    candidates.insert(path.to_string());
                }
            }
        }

        let mut files = BTreeMap::new();
        for path in candidates.into_iter().filter(|p| select(p)) {
            let full = work_dir.join(&path);
            if !full.is_file() {
                continue;
            }
            let content = std::fs::read(&full).map_err(|e| GitError::io(&full, e))?;
            files.insert(path, content);
        }
        Ok(files)
    }

    /// Write the repository index as a tree.
    ///
    /// Fails while the index still has conflicts.
    pub fn index_tree(&self) -> Result<Oid, GitError> {
        to_oid(self.repo.index()?.write_tree()?)
    }

    /// Conflicted entries of the repository index.
    pub fn index_conflicts(&self) -> Result<Vec<ConflictEntry>, GitError> {
        conflict_entries(&self.repo.index()?)
    }

    // =========================================================================
    // Tree Merging
    // =========================================================================

    /// Three-way merge of two commits' trees over their merge base.
    pub fn merge_commits(&self, ours: &Oid, theirs: &Oid) -> Result<TreeMerge, GitError> {
        let ours = self.repo.find_commit(to_git2(ours)?)?;
        let theirs = self.repo.find_commit(to_git2(theirs)?)?;
        let index = self.repo.merge_commits(&ours, &theirs, None)?;
        Ok(TreeMerge { index })
    }

    /// Apply the changes `commit` introduces on top of `onto`.
    pub fn cherry_pick(&self, commit: &Oid, onto: &Oid) -> Result<TreeMerge, GitError> {
        let commit = self.repo.find_commit(to_git2(commit)?)?;
        let onto = self.repo.find_commit(to_git2(onto)?)?;
        let index = self.repo.cherrypick_commit(&commit, &onto, 0, None)?;
        Ok(TreeMerge { index })
    }

    /// Resolve one conflicted path of a merge result.
    ///
    /// `Some(content)` stages the content at stage 0; `None` resolves the
    /// conflict as a deletion.
    pub fn resolve_conflict(
        &self,
        merge: &mut TreeMerge,
        path: &str,
        content: Option<&[u8]>,
    ) -> Result<(), GitError> {
        let mut template = None;
        for conflict in merge.index.conflicts()? {
            let conflict = conflict?;
            let candidate = conflict.our.or(conflict.their).or(conflict.ancestor);
            if let Some(entry) = candidate {
                if entry_path(&entry) == path {
                    template = Some(entry);
                    break;
                }
            }
        }
        let Some(mut entry) = template else {
            return Err(GitError::Internal {
                message: format!("no conflict recorded for '{}'", path),
            });
        };

        merge.index.conflict_remove(Path::new(path))?;
        if let Some(content) = content {
            entry.id = self.repo.blob(content)?;
            entry.file_size = u32::try_from(content.len()).unwrap_or(u32::MAX);
            entry.flags = u16::try_from(path.len().min(0xfff)).unwrap_or(0xfff);
            entry.flags_extended = 0;
            merge.index.add(&entry)?;
        }
        Ok(())
    }

    /// Write a conflict-free merge result as a tree.
    pub fn write_tree(&self, merge: &mut TreeMerge) -> Result<Oid, GitError> {
        to_oid(merge.index.write_tree_to(&self.repo)?)
    }

    /// Create a commit without moving any ref.
    ///
    /// The author is copied from `author_of` when given, otherwise it is the
    /// configured user, who is always the committer.
    pub fn create_commit(
        &self,
        tree: &Oid,
        parents: &[Oid],
        message: &str,
        author_of: Option<&Oid>,
    ) -> Result<Oid, GitError> {
        let committer = self.repo.signature()?;
        let author = match author_of {
            Some(oid) => self.repo.find_commit(to_git2(oid)?)?.author().to_owned(),
            None => committer.clone(),
        };
        let tree = self.repo.find_tree(to_git2(tree)?)?;
        let parents = parents
            .iter()
            .map(|p| Ok(self.repo.find_commit(to_git2(p)?)?))
            .collect::<Result<Vec<_>, GitError>>()?;
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(None, &author, &committer, message, &tree, &parent_refs)?;
        to_oid(oid)
    }

    // =========================================================================
    // Work Tree Updates
    // =========================================================================

    /// Move the index and work tree from HEAD's tree to a commit's. HEAD is
    /// not moved.
    ///
    /// Files that differ from HEAD, and untracked files the commit would
    /// create, are never overwritten: the checkout fails with
    /// [`GitError::WouldOverwrite`] before touching anything.
    pub fn checkout_commit(&self, oid: &Oid) -> Result<(), GitError> {
        let object = self
            .repo
            .find_object(to_git2(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let mut blocked = Vec::new();
        let result = {
            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout
                .safe()
                .notify_on(git2::CheckoutNotificationType::CONFLICT)
                .notify(|_, path, _, _, _| {
                    if let Some(path) = path {
                        blocked.push(path.to_string_lossy().into_owned());
                    }
                    true
                });
            self.repo.checkout_tree(&object, Some(&mut checkout))
        };

        match result {
            Ok(()) => Ok(()),
            Err(_) if !blocked.is_empty() => {
                blocked.sort();
                Err(GitError::WouldOverwrite { paths: blocked })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a conflicted merge result into the repository index and check it
    /// out, leaving conflict markers in the conflicted files.
    pub fn write_conflicts(&self, merge: &TreeMerge) -> Result<(), GitError> {
        let mut index = self.repo.index()?;
        index.clear()?;
        // Conflict stages 1-3 are carried in each entry's flags.
        for entry in merge.index.iter() {
            index.add(&entry)?;
        }
        index.write()?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout
            .force()
            .allow_conflicts(true)
            .conflict_style_merge(true);
        self.repo.checkout_index(Some(&mut index), Some(&mut checkout))?;
        Ok(())
    }

    /// Write resolved content for `path` into the work tree and stage it,
    /// clearing any conflict. `None` deletes the path instead.
    pub fn stage_resolution(&self, path: &str, content: Option<&[u8]>) -> Result<(), GitError> {
        let full = self.work_dir()?.join(path);
        let mut index = self.repo.index()?;
        match content {
            Some(content) => {
                if let Some(parent) = full.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| GitError::io(parent, e))?;
                }
                std::fs::write(&full, content).map_err(|e| GitError::io(&full, e))?;
                index.add_path(Path::new(path))?;
            }
            None => {
                if full.exists() {
                    std::fs::remove_file(&full).map_err(|e| GitError::io(&full, e))?;
                }
                index.remove_path(Path::new(path))?;
            }
        }
        index.write()?;
        Ok(())
    }

    /// Reset HEAD, index and work tree to a commit.
    pub fn reset_hard(&self, oid: &Oid) -> Result<(), GitError> {
        let object = self
            .repo
            .find_object(to_git2(oid)?, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        self.repo.reset(&object, git2::ResetType::Hard, None)?;
        Ok(())
    }

    /// Write a state file git itself understands, such as `MERGE_HEAD`.
    pub fn write_state_file(&self, name: &str, content: &str) -> Result<(), GitError> {
        let path = self.paths().git_state_file(name);
        std::fs::write(&path, content).map_err(|e| GitError::io(&path, e))
    }

    /// Remove `MERGE_HEAD`, `CHERRY_PICK_HEAD` and similar state files.
    pub fn cleanup_state(&self) -> Result<(), GitError> {
        self.repo.cleanup_state()?;
        Ok(())
    }
}
