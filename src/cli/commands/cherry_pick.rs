//! cli::commands::cherry_pick
//!
//! Apply existing commits onto HEAD.

use crate::cli::args::CherryPickArgs;
use crate::core::invocation::ArgSpec;
use crate::core::ops::{Operation, SequencerState};
use crate::core::signal::Die;
use crate::engine::gate::{requirements, RequirementSet};
use crate::engine::replay::{self, SHORT};
use crate::engine::{Execution, LogicalCommand, Outcome};

use super::{commit_of, in_progress};

#[derive(Debug, Default)]
pub struct CherryPick;

impl LogicalCommand for CherryPick {
    type Args = CherryPickArgs;
    const NAME: &'static str = "logicalcherry-pick";
    const MUTATING: bool = true;

    fn specs(&self, args: &CherryPickArgs) -> Vec<ArgSpec> {
        let commits = ArgSpec::revisions("commit", args.commits.clone());
        vec![
            if args.is_control() {
                commits
            } else {
                commits.required()
            },
            ArgSpec::flag("continue", args.continue_),
            ArgSpec::flag("skip", args.skip),
            ArgSpec::flag("abort", args.abort),
            ArgSpec::flag("quit", args.quit),
        ]
    }

    fn requirements(&self, args: &CherryPickArgs) -> &'static RequirementSet {
        if args.is_control() {
            &requirements::RESUME
        } else {
            &requirements::MUTATING
        }
    }

    fn execute(
        &mut self,
        x: &mut Execution<'_, '_>,
        args: &CherryPickArgs,
    ) -> Result<Outcome, Die> {
        if args.is_control() && !args.commits.is_empty() {
            return Err(Die::error(
                "--continue, --skip, --abort and --quit take no commits",
            ));
        }

        if args.abort {
            let state = in_progress(x, Operation::CherryPick)?;
            replay::abort(x.git, &state)?;
            return Ok(Outcome::Complete);
        }
        if args.quit {
            in_progress(x, Operation::CherryPick)?;
            replay::quit(x.git)?;
            return Ok(Outcome::Complete);
        }
        if args.continue_ {
            let mut state = in_progress(x, Operation::CherryPick)?;
            if let Some(current) = state.current.clone() {
                if let Some(new) = replay::commit_resolved(x.git, &current)? {
                    let summary = x.git.commit_info(&current)?.summary;
                    x.report.info(format!("[{}] {}", new.short(SHORT), summary));
                }
            }
            return drive(x, &mut state);
        }
        if args.skip {
            let mut state = in_progress(x, Operation::CherryPick)?;
            replay::skip_current(x.git, &mut state)?;
            return drive(x, &mut state);
        }

        let mut todo = Vec::new();
        for side in x.invocation.revisions("commit") {
            let commit = commit_of(side)?;
            if x.git.commit_info(commit)?.parents.len() > 1 {
                return Err(Die::error(format!(
                    "commit {} is a merge but no -m option was given.",
                    commit
                )));
            }
            todo.push(commit.clone());
        }

        let mut state = SequencerState::new(
            Operation::CherryPick,
            x.git.head_oid()?,
            x.git.head_ref()?,
            None,
            todo,
        );
        drive(x, &mut state)
    }
}

/// Replay what is left and clean up once nothing is.
fn drive(x: &mut Execution<'_, '_>, state: &mut SequencerState) -> Result<Outcome, Die> {
    let outcome = replay::run_todo(x, state)?;
    if outcome == Outcome::Complete {
        SequencerState::remove(&x.git.paths())?;
        x.git.cleanup_state()?;
    }
    Ok(outcome)
}
