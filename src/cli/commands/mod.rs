//! cli::commands
//!
//! The five logical commands.
//!
//! # Architecture
//!
//! Each command is a [`LogicalCommand`](crate::engine::LogicalCommand):
//! 1. Declares its arguments as specs for resolution
//! 2. Declares the preconditions the engine gates on
//! 3. Executes against the resolved [`Invocation`](crate::core::invocation::Invocation)
//!
//! Commands never print directly; everything goes through the
//! [`Report`](crate::ui::output::Report) of their execution.

mod cherry_pick;
mod diff;
mod merge;
mod mergetool;
mod rebase;

pub use cherry_pick::CherryPick;
pub use diff::Diff;
pub use merge::Merge;
pub use mergetool::Mergetool;
pub use rebase::Rebase;

use crate::core::ops::{Operation, SequencerState};
use crate::core::resolve::ResolvedRef;
use crate::core::signal::Die;
use crate::engine::Execution;

/// A revision the command declared as required.
fn required<'a>(x: &Execution<'a, '_>, name: &str) -> Result<&'a ResolvedRef, Die> {
    x.invocation
        .revision(name)
        .ok_or_else(|| Die::software(format!("argument \"{}\" was not resolved", name)))
}

/// The commit a resolved revision names.
fn commit_of(side: &ResolvedRef) -> Result<&crate::core::types::Oid, Die> {
    side.commit()
        .ok_or_else(|| Die::software(format!("{} does not name a commit", side)))
}

/// The interrupted `operation`, or a fatal error when there is none.
fn in_progress(x: &Execution<'_, '_>, operation: Operation) -> Result<SequencerState, Die> {
    match SequencerState::read(&x.git.paths())? {
        Some(state) if state.operation == operation => Ok(state),
        Some(state) => Err(Die::fatal(format!(
            "a {} is in progress, not a {}",
            state.operation.description(),
            operation.description()
        ))),
        None => Err(Die::fatal(format!(
            "no {} in progress",
            operation.description()
        ))),
    }
}
