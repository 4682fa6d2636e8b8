//! cli::commands::merge
//!
//! Join a commit into the current branch.
//!
//! Fast-forwards when possible. Otherwise the trees are merged in memory,
//! conflicting model files are handed to the comparison engine, and either a
//! merge commit is created or the remaining conflicts are written out in the
//! form `git commit` expects (`MERGE_HEAD`, `MERGE_MSG`, conflicted index).

use crate::cli::args::MergeArgs;
use crate::core::invocation::ArgSpec;
use crate::core::pathfilter::PathFilter;
use crate::core::resolve::ResolvedRef;
use crate::core::signal::Die;
use crate::engine::gate::{requirements, RequirementSet};
use crate::engine::replay::SHORT;
use crate::engine::{Execution, LogicalCommand, Outcome};

use super::{commit_of, required};

#[derive(Debug, Default)]
pub struct Merge;

impl LogicalCommand for Merge {
    type Args = MergeArgs;
    const NAME: &'static str = "logicalmerge";
    const MUTATING: bool = true;

    fn specs(&self, args: &MergeArgs) -> Vec<ArgSpec> {
        vec![
            ArgSpec::revision("commit", args.commit.clone()).required(),
            ArgSpec::text("message", args.message.clone()),
            ArgSpec::flag("no-ff", args.no_ff),
        ]
    }

    fn requirements(&self, _args: &MergeArgs) -> &'static RequirementSet {
        &requirements::MUTATING
    }

    fn execute(&mut self, x: &mut Execution<'_, '_>, _args: &MergeArgs) -> Result<Outcome, Die> {
        let git = x.git;
        let side = required(x, "commit")?;
        let theirs = commit_of(side)?.clone();
        let head = git.head_oid()?;

        if git.is_ancestor(&theirs, &head)? {
            x.report.line("Already up to date.");
            return Ok(Outcome::Complete);
        }

        if !x.invocation.flag("no-ff") && git.is_ancestor(&head, &theirs)? {
            x.report.info(format!(
                "Updating {}..{}",
                head.short(SHORT),
                theirs.short(SHORT)
            ));
            x.report.info("Fast-forward");
            git.checkout_commit(&theirs)?;
            git.update_head(&theirs, &format!("logical merge {}: Fast-forward", side))?;
            return Ok(Outcome::Complete);
        }

        if git.merge_base(&head, &theirs)?.is_none() {
            return Err(Die::fatal("refusing to merge unrelated histories"));
        }

        let mut merge = git.merge_commits(&head, &theirs)?;
        let report = x
            .comparator
            .resolve_tree_merge(git, &mut merge, &PathFilter::all())?;
        for path in &report.resolved {
            x.report.info(format!("Auto-merging {} (logical)", path));
        }

        let message = x
            .invocation
            .text("message")
            .map(str::to_string)
            .unwrap_or_else(|| default_message(side));

        if !report.is_clean() {
            git.write_conflicts(&merge)?;
            git.write_state_file("MERGE_HEAD", &format!("{}\n", theirs))?;
            git.write_state_file("MERGE_MSG", &format!("{}\n", message))?;
            for path in &report.unresolved {
                x.report
                    .line(format!("CONFLICT (content): Merge conflict in {}", path));
            }
            x.report
                .line("Automatic merge failed; fix conflicts and then commit the result.");
            return Ok(Outcome::Aborted);
        }

        let tree = git.write_tree(&mut merge)?;
        let new = git.create_commit(&tree, &[head, theirs], &message, None)?;
        git.checkout_commit(&new)?;
        git.update_head(&new, &format!("logical merge {}", side))?;
        x.report.line("Merge made by the 'logical' strategy.");
        Ok(Outcome::Complete)
    }
}

/// The message `git merge` would use for `side`.
fn default_message(side: &ResolvedRef) -> String {
    match side {
        ResolvedRef::Ref { name, commit } => {
            let full = name.as_str();
            if full.starts_with("refs/heads/") {
                format!("Merge branch '{}'", name.shorthand())
            } else if full.starts_with("refs/tags/") {
                format!("Merge tag '{}'", name.shorthand())
            } else if full.starts_with("refs/remotes/") {
                format!("Merge remote-tracking branch '{}'", name.shorthand())
            } else {
                format!("Merge commit '{}'", commit.short(SHORT))
            }
        }
        ResolvedRef::Commit(oid) => format!("Merge commit '{}'", oid.short(SHORT)),
        ResolvedRef::WorkingTree => "Merge".to_string(),
    }
}
