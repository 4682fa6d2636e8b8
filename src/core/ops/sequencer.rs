//! core::ops::sequencer
//!
//! Persisted state of an interrupted cherry-pick or rebase.
//!
//! When a replayed commit stops on conflicts, the remaining work is written to
//! `<git_dir>/logical/sequencer.json` so that `--continue`, `--skip`,
//! `--abort` and `--quit` can pick it up in a later invocation.
//!
//! # Invariants
//!
//! - At most one sequencer state exists per worktree
//! - `todo` never contains `current`
//! - The file is fsynced on every write

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::paths::LogicalPaths;
use crate::core::signal::Die;
use crate::core::types::{Oid, RefName, UtcTimestamp};

/// Errors from sequencer persistence.
#[derive(Debug, Error)]
pub enum SequencerError {
    #[error("sequencer i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sequencer json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<SequencerError> for Die {
    fn from(err: SequencerError) -> Self {
        Die::internal(err)
    }
}

/// Which command owns the sequencer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    CherryPick,
    Rebase,
}

impl Operation {
    /// Name used in messages.
    pub fn description(self) -> &'static str {
        match self {
            Operation::CherryPick => "cherry-pick",
            Operation::Rebase => "rebase",
        }
    }

    /// The command that continues this operation.
    pub fn command(self) -> &'static str {
        match self {
            Operation::CherryPick => "logicalcherry-pick",
            Operation::Rebase => "logicalrebase",
        }
    }
}

/// An interrupted replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    pub operation: Operation,
    /// HEAD before the operation started; `--abort` returns here.
    pub orig_head: Oid,
    /// Branch HEAD was attached to before the operation, if any.
    pub head_name: Option<RefName>,
    /// Rebase target. None for cherry-picks.
    pub onto: Option<Oid>,
    /// The commit that stopped on conflicts.
    pub current: Option<Oid>,
    /// Commits still to replay, in order.
    pub todo: Vec<Oid>,
    pub updated_at: UtcTimestamp,
}

impl SequencerState {
    pub fn new(
        operation: Operation,
        orig_head: Oid,
        head_name: Option<RefName>,
        onto: Option<Oid>,
        todo: Vec<Oid>,
    ) -> Self {
        Self {
            operation,
            orig_head,
            head_name,
            onto,
            current: None,
            todo,
            updated_at: UtcTimestamp::now(),
        }
    }

    pub fn path(paths: &LogicalPaths) -> PathBuf {
        paths.sequencer_path()
    }

    /// Move the next todo entry into `current` and return it.
    pub fn advance(&mut self) -> Option<Oid> {
        if self.todo.is_empty() {
            self.current = None;
            return None;
        }
        let next = self.todo.remove(0);
        self.current = Some(next.clone());
        Some(next)
    }

    /// Write the state to disk.
    pub fn write(&mut self, paths: &LogicalPaths) -> Result<(), SequencerError> {
        fs::create_dir_all(paths.worktree_dir())?;
        self.updated_at = UtcTimestamp::now();

        let content = serde_json::to_string_pretty(self)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(Self::path(paths))?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Read the state, if an operation is in progress.
    pub fn read(paths: &LogicalPaths) -> Result<Option<Self>, SequencerError> {
        let path = Self::path(paths);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn remove(paths: &LogicalPaths) -> Result<(), SequencerError> {
        let path = Self::path(paths);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    pub fn exists(paths: &LogicalPaths) -> bool {
        Self::path(paths).exists()
    }
}
