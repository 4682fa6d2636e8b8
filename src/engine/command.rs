//! engine::command
//!
//! Command trait for lifecycle integration.
//!
//! # Architecture
//!
//! Every logical command implements [`LogicalCommand`]. The trait splits a
//! command into the pieces the lifecycle drives separately:
//!
//! 1. `Args`: the clap-derived options, parsed in the Unparsed phase
//! 2. [`LogicalCommand::specs`]: the arguments to resolve in the Validated phase
//! 3. [`LogicalCommand::requirements`]: the preconditions gated before execution
//! 4. [`LogicalCommand::execute`]: the command's own logic
//!
//! The registry stores commands as `Box<dyn Runnable>`; every
//! `LogicalCommand` is `Runnable` through a blanket implementation.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Default)]
//! struct Show;
//!
//! impl LogicalCommand for Show {
//!     type Args = ShowArgs;
//!     const NAME: &'static str = "logicalshow";
//!
//!     fn specs(&self, args: &ShowArgs) -> Vec<ArgSpec> {
//!         vec![ArgSpec::revision("commit", args.commit.clone()).required()]
//!     }
//!
//!     fn execute(&mut self, x: &mut Execution<'_, '_>, _args: &ShowArgs) -> Result<Outcome, Die> {
//!         x.report.line("shown");
//!         Ok(Outcome::Complete)
//!     }
//! }
//! ```

use std::io::Write;

use clap::{Args, CommandFactory, Parser};

use super::gate::{requirements, RequirementSet};
use super::Context;
use crate::compare::Comparator;
use crate::core::config::Config;
use crate::core::invocation::{ArgSpec, Invocation};
use crate::core::signal::{Die, ReturnCode};
use crate::git::Git;
use crate::ui::output::Report;

/// Options every logical command accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct CommonArgs {
    /// Path to the repository's git directory
    #[arg(long = "git-dir", value_name = "path")]
    pub git_dir: Option<String>,

    /// Print results only
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Print diagnostic output
    #[arg(long = "debug")]
    pub debug: bool,

    #[arg(short = 'h', long = "help", help = "Displays help for this command.")]
    pub help: bool,
}

/// Access to the common options of a command's argument struct.
pub trait CommandArgs: Parser {
    fn common(&self) -> &CommonArgs;
}

/// How an executed command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Ran to completion.
    Complete,
    /// Stopped on unresolved conflicts.
    Aborted,
}

impl Outcome {
    pub fn return_code(self) -> ReturnCode {
        match self {
            Outcome::Complete => ReturnCode::Complete,
            Outcome::Aborted => ReturnCode::Aborted,
        }
    }
}

/// Everything a command may use while executing.
pub struct Execution<'a, 'o> {
    pub git: &'a Git,
    pub invocation: &'a Invocation,
    pub config: &'a Config,
    pub comparator: &'a Comparator,
    pub report: &'a mut Report<'o>,
}

impl std::fmt::Debug for Execution<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Execution")
            .field("git", self.git)
            .field("invocation", self.invocation)
            .field("comparator", self.comparator)
            .finish()
    }
}

/// A command that runs through the lifecycle.
pub trait LogicalCommand: Default {
    /// The command's options.
    type Args: CommandArgs;

    /// The registered command name.
    const NAME: &'static str;

    /// Whether the command changes the repository and must hold the lock.
    const MUTATING: bool = false;

    /// Arguments to resolve, in the order they are resolved.
    fn specs(&self, args: &Self::Args) -> Vec<ArgSpec>;

    /// Preconditions for this invocation.
    fn requirements(&self, _args: &Self::Args) -> &'static RequirementSet {
        &requirements::READ_ONLY
    }

    /// Run the command against validated arguments.
    fn execute(&mut self, x: &mut Execution<'_, '_>, args: &Self::Args) -> Result<Outcome, Die>;
}

/// Object-safe face of a [`LogicalCommand`], used by the registry.
pub trait Runnable {
    fn name(&self) -> &'static str;

    /// One-line usage of the command.
    fn usage(&self) -> String;

    /// Run the whole lifecycle on raw arguments.
    fn run(
        self: Box<Self>,
        ctx: &Context,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<ReturnCode, Die>;
}

impl<C: LogicalCommand> Runnable for C {
    fn name(&self) -> &'static str {
        C::NAME
    }

    fn usage(&self) -> String {
        usage_of::<C>()
    }

    fn run(
        self: Box<Self>,
        ctx: &Context,
        args: &[String],
        out: &mut dyn Write,
    ) -> Result<ReturnCode, Die> {
        super::lifecycle::run(*self, ctx, args, out)
    }
}

/// Usage line rendered by clap, without the `Usage: ` heading.
pub fn usage_of<C: LogicalCommand>() -> String {
    let usage = C::Args::command().name(C::NAME).render_usage().to_string();
    usage
        .strip_prefix("Usage: ")
        .unwrap_or(&usage)
        .trim_end()
        .to_string()
}

/// Full help rendered by clap.
pub fn help_of<C: LogicalCommand>() -> String {
    C::Args::command().name(C::NAME).render_help().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    #[command(disable_help_flag = true)]
    struct TestArgs {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(value_name = "commit")]
        commit: Option<String>,
    }

    impl CommandArgs for TestArgs {
        fn common(&self) -> &CommonArgs {
            &self.common
        }
    }

    #[derive(Default)]
    struct TestCommand;

    impl LogicalCommand for TestCommand {
        type Args = TestArgs;
        const NAME: &'static str = "logicaltest";

        fn specs(&self, args: &TestArgs) -> Vec<ArgSpec> {
            vec![ArgSpec::revision("commit", args.commit.clone())]
        }

        fn execute(
            &mut self,
            _x: &mut Execution<'_, '_>,
            _args: &TestArgs,
        ) -> Result<Outcome, Die> {
            Ok(Outcome::Complete)
        }
    }

    #[test]
    fn outcome_codes() {
        assert_eq!(Outcome::Complete.return_code(), ReturnCode::Complete);
        assert_eq!(Outcome::Aborted.return_code(), ReturnCode::Aborted);
    }

    #[test]
    fn usage_names_command() {
        let usage = usage_of::<TestCommand>();
        assert!(usage.starts_with("logicaltest"), "{usage}");
        assert!(usage.contains("[commit]"), "{usage}");
    }

    #[test]
    fn help_lists_common_options() {
        let help = help_of::<TestCommand>();
        assert!(help.contains("--git-dir"));
        assert!(help.contains("--quiet"));
        assert!(help.contains("Displays help for this command."));
    }

    #[test]
    fn runnable_reports_name() {
        let command: Box<dyn Runnable> = Box::new(TestCommand);
        assert_eq!(command.name(), "logicaltest");
        assert!(!TestCommand::MUTATING);
    }

    #[test]
    fn common_args_parse() {
        let args = TestArgs::try_parse_from(["logicaltest", "-q", "--git-dir", "x", "HEAD"]).unwrap();
        assert!(args.common().quiet);
        assert_eq!(args.common().git_dir.as_deref(), Some("x"));
        assert_eq!(args.commit.as_deref(), Some("HEAD"));
    }
}
