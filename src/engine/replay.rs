//! engine::replay
//!
//! Replaying commits onto HEAD, shared by cherry-pick and rebase.
//!
//! Each commit is merged onto HEAD in memory, its conflicts are offered to the
//! comparison engine, and a clean result is committed with the original
//! author and message. The first commit whose conflicts the engine cannot
//! settle stops the replay: the conflicts are written to the index and work
//! tree and the remaining work is persisted as a [`SequencerState`].
//!
//! The state is also persisted before every commit is replayed, so an
//! operation that fails midway can always be aborted.

use crate::core::ops::{Operation, SequencerState};
use crate::core::pathfilter::PathFilter;
use crate::core::signal::Die;
use crate::core::types::Oid;
use crate::git::Git;

use super::command::{Execution, Outcome};

/// Abbreviated object names in messages.
pub const SHORT: usize = 7;

/// What replaying a single commit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A new commit was created and HEAD moved to it.
    Picked { new: Oid, summary: String },
    /// The commit introduced nothing on top of HEAD.
    Empty,
    /// Conflicts remain in the listed paths.
    Stopped { unresolved: Vec<String> },
}

/// Replay one commit onto HEAD.
pub fn pick(x: &mut Execution<'_, '_>, commit: &Oid) -> Result<Step, Die> {
    let git = x.git;
    let head = git.head_oid()?;
    let info = git.commit_info(commit)?;
    x.report.debug(format!(
        "picking {} by {} <{}> from {}",
        commit.short(SHORT),
        info.author_name,
        info.author_email,
        info.author_time.to_rfc3339()
    ));
    let mut merge = git.cherry_pick(commit, &head)?;
    let report = x
        .comparator
        .resolve_tree_merge(git, &mut merge, &PathFilter::all())?;
    for path in &report.resolved {
        x.report.debug(format!("resolved {} (logical)", path));
    }

    if !report.is_clean() {
        git.write_conflicts(&merge)?;
        return Ok(Step::Stopped {
            unresolved: report.unresolved,
        });
    }

    let tree = git.write_tree(&mut merge)?;
    if tree == git.commit_tree(&head)? {
        return Ok(Step::Empty);
    }

    let new = git.create_commit(&tree, &[head], &info.message, Some(commit))?;
    git.checkout_commit(&new)?;
    git.update_head(&new, &format!("logical: pick {}", info.summary))?;
    Ok(Step::Picked {
        new,
        summary: info.summary,
    })
}

/// Commit the index as the resolution of a stopped `commit`.
///
/// Only HEAD moves: the index already holds the new tree and unstaged work
/// tree edits are kept. Returns `None` when the resolution leaves HEAD's
/// tree unchanged.
///
/// # Errors
///
/// An error when the index still holds conflicts.
pub fn commit_resolved(git: &Git, commit: &Oid) -> Result<Option<Oid>, Die> {
    if !git.index_conflicts()?.is_empty() {
        return Err(Die::error(
            "Committing is not possible because you have unmerged files.",
        ));
    }

    let head = git.head_oid()?;
    let tree = git.index_tree()?;
    let committed = if tree == git.commit_tree(&head)? {
        None
    } else {
        let info = git.commit_info(commit)?;
        let new = git.create_commit(&tree, &[head], &info.message, Some(commit))?;
        git.update_head(&new, &format!("logical: pick {}", info.summary))?;
        Some(new)
    };
    git.cleanup_state()?;
    Ok(committed)
}

/// Replay the remaining todo list of `state`.
///
/// Returns [`Outcome::Aborted`] after persisting `state` when a commit stops
/// on conflicts, and [`Outcome::Complete`] once the list is exhausted. The
/// caller finishes or removes the state in the complete case.
pub fn run_todo(x: &mut Execution<'_, '_>, state: &mut SequencerState) -> Result<Outcome, Die> {
    let paths = x.git.paths();
    loop {
        // The commit about to be replayed stays in the todo list on disk.
        state.current = None;
        state.write(&paths)?;
        let Some(commit) = state.advance() else {
            break;
        };
        match pick(x, &commit)? {
            Step::Picked { new, summary } => {
                x.report.info(format!("[{}] {}", new.short(SHORT), summary));
            }
            Step::Empty => {
                x.report
                    .info(format!("Skipping empty commit {}", commit.short(SHORT)));
            }
            Step::Stopped { unresolved } => {
                for path in &unresolved {
                    x.report
                        .line(format!("CONFLICT (content): Merge conflict in {}", path));
                }
                state.write(&paths)?;
                if state.operation == Operation::CherryPick {
                    x.git
                        .write_state_file("CHERRY_PICK_HEAD", &format!("{}\n", commit))?;
                }

                let summary = x.git.commit_info(&commit)?.summary;
                let command = state.operation.command();
                x.report.line(format!(
                    "error: could not apply {}... {}",
                    commit.short(SHORT),
                    summary
                ));
                x.report.line(format!(
                    "hint: resolve all conflicts (for example with \"logicalmergetool\"), stage them, then run \"{} --continue\".",
                    command
                ));
                x.report.line(format!(
                    "hint: use \"{} --skip\" to drop this commit or \"{} --abort\" to start over.",
                    command, command
                ));
                return Ok(Outcome::Aborted);
            }
        }
    }
    Ok(Outcome::Complete)
}

/// Return to where the operation started and forget it.
pub fn abort(git: &Git, state: &SequencerState) -> Result<(), Die> {
    match &state.head_name {
        Some(head_name) => git.attach_head(head_name)?,
        None => git.detach_head(&state.orig_head)?,
    }
    // Moves the attached branch back as well.
    git.reset_hard(&state.orig_head)?;
    SequencerState::remove(&git.paths())?;
    git.cleanup_state()?;
    Ok(())
}

/// Forget the operation, leaving HEAD and the work tree as they are.
pub fn quit(git: &Git) -> Result<(), Die> {
    SequencerState::remove(&git.paths())?;
    git.cleanup_state()?;
    Ok(())
}

/// Discard the conflicted replay of the current commit.
///
/// After a failure midway, the commit that failed is still first in the todo
/// list and is dropped instead.
pub fn skip_current(git: &Git, state: &mut SequencerState) -> Result<(), Die> {
    if state.current.is_none() {
        state.advance();
    }
    let head = git.head_oid()?;
    git.reset_hard(&head)?;
    git.cleanup_state()?;
    Ok(())
}
