//! cli::commands::rebase
//!
//! Reapply commits on top of another base.
//!
//! HEAD is detached at the new base while commits are replayed; the original
//! branch only moves, with a compare-and-swap against where it started, once
//! every commit has been applied.

use crate::cli::args::RebaseArgs;
use crate::core::invocation::ArgSpec;
use crate::core::ops::{Operation, SequencerState};
use crate::core::resolve::ResolvedRef;
use crate::core::signal::Die;
use crate::core::types::{BranchName, RefName};
use crate::engine::gate::{requirements, RequirementSet};
use crate::engine::replay::{self, SHORT};
use crate::engine::{Execution, LogicalCommand, Outcome};

use super::{commit_of, in_progress};

#[derive(Debug, Default)]
pub struct Rebase;

impl LogicalCommand for Rebase {
    type Args = RebaseArgs;
    const NAME: &'static str = "logicalrebase";
    const MUTATING: bool = true;

    fn specs(&self, args: &RebaseArgs) -> Vec<ArgSpec> {
        vec![
            ArgSpec::revision("upstream", args.upstream.clone()),
            ArgSpec::revision("branch", args.branch.clone()),
            ArgSpec::flag("continue", args.continue_),
            ArgSpec::flag("skip", args.skip),
            ArgSpec::flag("abort", args.abort),
        ]
    }

    fn requirements(&self, args: &RebaseArgs) -> &'static RequirementSet {
        if args.is_control() {
            &requirements::RESUME
        } else {
            &requirements::MUTATING
        }
    }

    fn execute(&mut self, x: &mut Execution<'_, '_>, args: &RebaseArgs) -> Result<Outcome, Die> {
        if args.is_control() && (args.upstream.is_some() || args.branch.is_some()) {
            return Err(Die::error("--continue, --skip and --abort take no arguments"));
        }

        if args.abort {
            let state = in_progress(x, Operation::Rebase)?;
            replay::abort(x.git, &state)?;
            return Ok(Outcome::Complete);
        }
        if args.continue_ {
            let mut state = in_progress(x, Operation::Rebase)?;
            if let Some(current) = state.current.clone() {
                if let Some(new) = replay::commit_resolved(x.git, &current)? {
                    let summary = x.git.commit_info(&current)?.summary;
                    x.report.info(format!("[{}] {}", new.short(SHORT), summary));
                }
            }
            return drive(x, &mut state);
        }
        if args.skip {
            let mut state = in_progress(x, Operation::Rebase)?;
            replay::skip_current(x.git, &mut state)?;
            return drive(x, &mut state);
        }

        start(x)
    }
}

fn start(x: &mut Execution<'_, '_>) -> Result<Outcome, Die> {
    let git = x.git;

    if let Some(branch) = x.invocation.revision("branch") {
        let commit = commit_of(branch)?;
        git.checkout_commit(commit)?;
        match branch {
            ResolvedRef::Ref { name, .. } if name.is_branch_ref() => git.attach_head(name)?,
            _ => git.detach_head(commit)?,
        }
    }

    let orig_head = git.head_oid()?;
    let head_name = git.head_ref()?;

    let onto = match x.invocation.revision("upstream") {
        Some(upstream) => commit_of(upstream)?.clone(),
        None => {
            let upstream = match &head_name {
                Some(name) => git.upstream_of(name)?,
                None => None,
            };
            let upstream = upstream.ok_or_else(|| {
                Die::error("There is no tracking information for the current branch.")
            })?;
            x.report.debug(format!("upstream: {}", upstream));
            git.resolve_ref(upstream.as_str())?
        }
    };

    if git.is_ancestor(&onto, &orig_head)? {
        return up_to_date(x, head_name.as_ref().and_then(RefName::branch));
    }

    let todo = git.commits_between(&onto, &orig_head)?;
    let mut state = SequencerState::new(
        Operation::Rebase,
        orig_head,
        head_name,
        Some(onto.clone()),
        todo,
    );
    let paths = git.paths();
    state.write(&paths)?;

    x.report
        .info("First, rewinding head to replay your work on top of it...");
    if let Err(err) = git.checkout_commit(&onto) {
        // Nothing was touched yet.
        SequencerState::remove(&paths)?;
        return Err(err.into());
    }
    git.detach_head(&onto)?;
    drive(x, &mut state)
}

fn up_to_date(x: &mut Execution<'_, '_>, branch: Option<BranchName>) -> Result<Outcome, Die> {
    match branch {
        Some(name) => x
            .report
            .line(format!("Current branch {} is up to date.", name)),
        None => x.report.line("Current branch HEAD is up to date."),
    }
    Ok(Outcome::Complete)
}

/// Replay what is left, then move the original branch to the result.
fn drive(x: &mut Execution<'_, '_>, state: &mut SequencerState) -> Result<Outcome, Die> {
    let outcome = replay::run_todo(x, state)?;
    if outcome != Outcome::Complete {
        return Ok(outcome);
    }

    let git = x.git;
    let new = git.head_oid()?;
    match &state.head_name {
        Some(name) => {
            git.update_ref_cas(
                name.as_str(),
                &new,
                Some(&state.orig_head),
                "logical rebase (finish)",
            )?;
            git.attach_head(name)?;
            x.report
                .line(format!("Successfully rebased and updated {}.", name));
        }
        None => {
            x.report
                .line("Successfully rebased and updated detached HEAD.");
        }
    }
    SequencerState::remove(&git.paths())?;
    git.cleanup_state()?;
    Ok(Outcome::Complete)
}
