//! cli::commands::mergetool
//!
//! Resolve conflicted model files in the index.

use crate::cli::args::MergetoolArgs;
use crate::core::invocation::ArgSpec;
use crate::core::signal::Die;
use crate::engine::gate::{requirements, RequirementSet};
use crate::engine::{Execution, LogicalCommand, Outcome};

/// Run the comparison engine over the conflicted entries of the index.
///
/// Every resolution is written to the work tree and staged. Conflicts the
/// engine cannot settle, and conflicts in non-model files, are left as they
/// are for another tool.
#[derive(Debug, Default)]
pub struct Mergetool;

impl LogicalCommand for Mergetool {
    type Args = MergetoolArgs;
    const NAME: &'static str = "logicalmergetool";
    const MUTATING: bool = true;

    fn specs(&self, args: &MergetoolArgs) -> Vec<ArgSpec> {
        vec![ArgSpec::paths("path", args.paths.clone())]
    }

    fn requirements(&self, _args: &MergetoolArgs) -> &'static RequirementSet {
        &requirements::WORK_TREE
    }

    fn execute(
        &mut self,
        x: &mut Execution<'_, '_>,
        _args: &MergetoolArgs,
    ) -> Result<Outcome, Die> {
        let filter = x.invocation.paths("path");
        let report = x.comparator.resolve_index(x.git, &filter)?;

        if report.resolved.is_empty() && report.unresolved.is_empty() {
            x.report.line("No files need merging");
            return Ok(Outcome::Complete);
        }

        for path in &report.resolved {
            x.report.line(format!("Merged {} (logical)", path));
        }
        for path in &report.unresolved {
            x.report.line(format!("Unresolved conflict in {}", path));
        }

        if report.is_clean() {
            Ok(Outcome::Complete)
        } else {
            Ok(Outcome::Aborted)
        }
    }
}
