//! cli::commands::diff
//!
//! Show model changes between two commits or a commit and the work tree.

use crate::cli::args::DiffArgs;
use crate::core::invocation::ArgSpec;
use crate::core::resolve::ResolvedRef;
use crate::core::signal::Die;
use crate::engine::gate::{requirements, RequirementSet};
use crate::engine::{Execution, LogicalCommand, Outcome};

use super::required;

/// Compare the model files of a commit with another commit or the work tree.
#[derive(Debug, Default)]
pub struct Diff;

impl LogicalCommand for Diff {
    type Args = DiffArgs;
    const NAME: &'static str = "logicaldiff";

    fn specs(&self, args: &DiffArgs) -> Vec<ArgSpec> {
        vec![
            ArgSpec::revision("commit", args.commit.clone()).required(),
            ArgSpec::revision("compareWith", args.compare_with.clone()),
            ArgSpec::paths("path", args.paths.clone()),
        ]
    }

    fn requirements(&self, args: &DiffArgs) -> &'static RequirementSet {
        if args.compare_with.is_some() {
            &requirements::READ_ONLY
        } else {
            &requirements::WORK_TREE
        }
    }

    fn execute(&mut self, x: &mut Execution<'_, '_>, _args: &DiffArgs) -> Result<Outcome, Die> {
        let left = required(x, "commit")?;
        let right = x
            .invocation
            .revision("compareWith")
            .cloned()
            .unwrap_or(ResolvedRef::WorkingTree);
        let filter = x.invocation.paths("path");
        x.report.debug(format!("comparing {} with {}", left, right));

        let comparison = x.comparator.compare(x.git, left, &right, &filter)?;
        if comparison.is_empty() {
            x.report.line("No differences.");
        }
        for change in &comparison.changes {
            x.report.line(change);
        }
        Ok(Outcome::Complete)
    }
}
