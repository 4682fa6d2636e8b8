//! compare::engine
//!
//! The comparison engine seam.
//!
//! Engines are injected capabilities with two entry points: compare two
//! snapshots, or merge three. Results are plain data so that the invocation
//! layer can translate them into command outcomes.

use thiserror::Error;

use super::snapshot::Snapshot;
use crate::core::pathfilter::PathFilter;

/// Errors from a comparison engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot start comparison engine '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("comparison engine '{command}' failed with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("comparison engine reported an unreadable line: {0}")]
    Protocol(String),

    #[error("comparison engine i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a path differs between two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Added,
    Deleted,
    Modified,
}

impl ChangeKind {
    pub fn code(self) -> char {
        match self {
            ChangeKind::Added => 'A',
            ChangeKind::Deleted => 'D',
            ChangeKind::Modified => 'M',
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(ChangeKind::Added),
            "D" => Some(ChangeKind::Deleted),
            "M" => Some(ChangeKind::Modified),
            _ => None,
        }
    }
}

/// One differing path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Change {
    pub path: String,
    pub kind: ChangeKind,
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.kind.code(), self.path)
    }
}

/// Result of comparing two snapshots, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub changes: Vec<Change>,
}

impl Comparison {
    pub fn new(mut changes: Vec<Change>) -> Self {
        changes.sort();
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Result of a three-way merge.
///
/// `merged` holds the content of every path the engine resolved to content,
/// and `deleted` every path it resolved as a deletion. `conflicts` names the
/// paths left unresolved. `conflicted` records that the engine reported
/// conflicts at all: when it is set and no path is named, nothing the engine
/// was given counts as resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeVerdict {
    pub merged: Snapshot,
    pub deleted: Vec<String>,
    pub conflicts: Vec<String>,
    pub conflicted: bool,
}

/// How the engine settled one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled<'a> {
    Content(&'a [u8]),
    Deleted,
    Unresolved,
}

impl MergeVerdict {
    /// A verdict without conflicts.
    pub fn clean(merged: Snapshot, deleted: Vec<String>) -> Self {
        Self {
            merged,
            deleted,
            conflicts: Vec::new(),
            conflicted: false,
        }
    }

    pub fn is_clean(&self) -> bool {
        !self.conflicted && self.conflicts.is_empty()
    }

    pub fn is_conflicted(&self, path: &str) -> bool {
        (self.conflicted && self.conflicts.is_empty()) || self.conflicts.iter().any(|p| p == path)
    }

    /// The resolution of `path`.
    ///
    /// A path the engine neither merged nor deleted is unresolved.
    pub fn settle(&self, path: &str) -> Settled<'_> {
        if self.is_conflicted(path) {
            return Settled::Unresolved;
        }
        match self.merged.get(path) {
            Some(content) => Settled::Content(content),
            None if self.deleted.iter().any(|p| p == path) => Settled::Deleted,
            None => Settled::Unresolved,
        }
    }
}

/// A model comparison and merge engine.
pub trait ComparisonEngine {
    /// Short name for diagnostics.
    fn name(&self) -> &str;

    /// Changes that turn `left` into `right`.
    fn compare(
        &self,
        left: &Snapshot,
        right: &Snapshot,
        filter: &PathFilter,
    ) -> Result<Comparison, EngineError>;

    /// Merge `ours` and `theirs` over their common `base`.
    fn merge(
        &self,
        base: &Snapshot,
        ours: &Snapshot,
        theirs: &Snapshot,
        filter: &PathFilter,
    ) -> Result<MergeVerdict, EngineError>;
}
