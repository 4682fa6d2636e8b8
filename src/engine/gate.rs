//! engine::gate
//!
//! Precondition gating for command execution.
//!
//! # Architecture
//!
//! Each command declares, per invocation, the [`RequirementSet`] it needs.
//! Gating runs after the repository is open and before anything is mutated.
//! An unmet requirement is a fatal death signal carrying a message that says
//! what to do about it.
//!
//! There is no global "repository is usable" check: `logicaldiff` against a
//! commit needs nothing, while starting a rebase needs a work tree, a clean
//! index, and no other operation in progress.
//!
//! # Example
//!
//! ```ignore
//! use logical_git::engine::gate::{gate, requirements};
//!
//! gate(&git, &requirements::MUTATING)?;
//! ```

use crate::core::ops::SequencerState;
use crate::core::signal::Die;
use crate::git::Git;

/// A single precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// The repository has a work tree.
    WorkTree,
    /// HEAD points at a commit.
    BornHead,
    /// No staged or unstaged changes to tracked files.
    CleanWorkTree,
    /// No git operation (merge, cherry-pick, ...) and no interrupted logical
    /// operation in progress.
    NoOperation,
}

/// Requirements for a command to execute.
#[derive(Debug, Clone)]
pub struct RequirementSet {
    /// Human-readable name for this requirement set.
    pub name: &'static str,
    pub requirements: &'static [Requirement],
}

impl RequirementSet {
    pub const fn new(name: &'static str, requirements: &'static [Requirement]) -> Self {
        Self { name, requirements }
    }

    pub fn contains(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }
}

/// Predefined requirement sets for common command categories.
pub mod requirements {
    use super::{Requirement, RequirementSet};

    /// Reads commits only.
    pub const READ_ONLY: RequirementSet = RequirementSet::new("read-only", &[]);

    /// Reads the work tree.
    pub const WORK_TREE: RequirementSet =
        RequirementSet::new("work-tree", &[Requirement::WorkTree]);

    /// Continues, skips or aborts an interrupted operation.
    pub const RESUME: RequirementSet =
        RequirementSet::new("resume", &[Requirement::WorkTree, Requirement::BornHead]);

    /// Starts a new history-changing operation.
    pub const MUTATING: RequirementSet = RequirementSet::new(
        "mutating",
        &[
            Requirement::WorkTree,
            Requirement::BornHead,
            Requirement::NoOperation,
            Requirement::CleanWorkTree,
        ],
    );
}

/// Check every requirement of `set`, in declared order.
///
/// # Errors
///
/// A fatal [`Die`] naming the first unmet requirement.
pub fn gate(git: &Git, set: &RequirementSet) -> Result<(), Die> {
    for requirement in set.requirements {
        check(git, *requirement)?;
    }
    Ok(())
}

fn check(git: &Git, requirement: Requirement) -> Result<(), Die> {
    match requirement {
        Requirement::WorkTree => {
            if git.work_dir().is_err() {
                return Err(Die::fatal("this operation must be run in a work tree"));
            }
        }
        Requirement::BornHead => {
            if git.head_oid().is_err() {
                return Err(Die::fatal("HEAD does not point to a commit yet"));
            }
        }
        Requirement::CleanWorkTree => {
            if !git.is_worktree_clean()? {
                return Err(Die::fatal(
                    "your local changes would be overwritten; commit or stash them first",
                ));
            }
        }
        Requirement::NoOperation => {
            if let Some(state) = SequencerState::read(&git.paths())? {
                let op = state.operation;
                return Err(Die::fatal(format!(
                    "a {} is already in progress; use \"{} --continue\" or \"{} --abort\"",
                    op.description(),
                    op.command(),
                    op.command()
                )));
            }
            let state = git.state();
            if state.is_in_progress() {
                return Err(Die::fatal(format!(
                    "a {} is in progress; finish or abort it first",
                    state
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_sets() {
        assert!(requirements::READ_ONLY.requirements.is_empty());
        assert!(requirements::MUTATING.contains(Requirement::CleanWorkTree));
        assert!(!requirements::RESUME.contains(Requirement::NoOperation));
        assert_eq!(requirements::WORK_TREE.name, "work-tree");
    }

    #[test]
    fn work_tree_checked_first() {
        assert_eq!(
            requirements::MUTATING.requirements.first(),
            Some(&Requirement::WorkTree)
        );
    }
}
