//! engine::lifecycle
//!
//! The lifecycle every logical command runs through.
//!
//! ```text
//! Unparsed -> Validated -> Built -> Executed -> Reported
//!     \           \          \         \
//!      +-----------+----------+---------+--> Failed
//! ```
//!
//! - **Unparsed -> Validated**: clap parses the command's options. Malformed
//!   input is a fatal death signal carrying the command's usage.
//! - **Validated -> Built**: the repository is opened, every declared argument
//!   is resolved, configuration is loaded and preconditions are gated.
//! - **Built -> Executed**: the command runs.
//! - **Executed -> Reported**: buffered output is flushed and the outcome
//!   becomes a return code.
//!
//! The output [`Report`] is owned by [`run`], so it is flushed on every exit
//! path, including failures.

use std::io::Write;
use std::path::Path;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::Parser;

use super::command::{help_of, usage_of, CommandArgs, Execution, LogicalCommand};
use super::gate::gate;
use super::Context;
use crate::compare::Comparator;
use crate::core::config::Config;
use crate::core::invocation::{ArgSpec, InvocationBuilder};
use crate::core::ops::RepoLock;
use crate::core::resolve::{ArgError, ResolveContext};
use crate::core::signal::{Die, ReturnCode};
use crate::git::RepositoryResolver;
use crate::ui::output::{Report, Verbosity};

/// Lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unparsed,
    Validated,
    Built,
    Executed,
    Reported,
    Failed,
}

impl Phase {
    /// The phase that normally follows this one.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Unparsed => Some(Phase::Validated),
            Phase::Validated => Some(Phase::Built),
            Phase::Built => Some(Phase::Executed),
            Phase::Executed => Some(Phase::Reported),
            Phase::Reported | Phase::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Reported | Phase::Failed)
    }

    /// Whether moving from `self` to `to` is allowed.
    ///
    /// `Validated -> Reported` is the help short-cut.
    pub fn can_move_to(self, to: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Phase::Failed
            || self.next() == Some(to)
            || (self == Phase::Validated && to == Phase::Reported)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Unparsed => "unparsed",
            Phase::Validated => "validated",
            Phase::Built => "built",
            Phase::Executed => "executed",
            Phase::Reported => "reported",
            Phase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Tracks the current phase of one run.
#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            phase: Phase::Unparsed,
        }
    }
}

impl Lifecycle {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to `to`.
    ///
    /// # Errors
    ///
    /// A software error for a transition the lifecycle does not allow.
    pub fn advance(&mut self, to: Phase) -> Result<(), Die> {
        if !self.phase.can_move_to(to) {
            return Err(Die::software(format!(
                "illegal lifecycle transition {} -> {}",
                self.phase, to
            )));
        }
        self.phase = to;
        Ok(())
    }

    /// Record a failure. Terminal phases are left alone.
    pub fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Failed;
        }
    }
}

/// Turn a clap parse error into a fatal death signal.
pub fn parse_error(err: &clap::Error, usage: &str) -> Die {
    let message = match err.kind() {
        ErrorKind::UnknownArgument => match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(arg)) => format!("\"{}\" is not a valid option", arg),
            _ => first_line(err),
        },
        ErrorKind::MissingRequiredArgument => match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::Strings(args)) if !args.is_empty() => {
                let name = args[0].trim_start_matches('<').trim_end_matches('>');
                ArgError::Required(name.to_string()).to_string()
            }
            _ => first_line(err),
        },
        _ => first_line(err),
    };
    Die::fatal(message).with_usage(usage)
}

fn first_line(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

/// Run one command through the whole lifecycle.
///
/// # Errors
///
/// Any death signal raised in any phase; buffered output is flushed first.
pub fn run<C: LogicalCommand>(
    command: C,
    ctx: &Context,
    args: &[String],
    out: &mut dyn Write,
) -> Result<ReturnCode, Die> {
    let mut lifecycle = Lifecycle::default();
    let result = drive(command, ctx, args, out, &mut lifecycle);
    if result.is_err() {
        lifecycle.fail();
    }
    result
}

fn drive<C: LogicalCommand>(
    mut command: C,
    ctx: &Context,
    args: &[String],
    out: &mut dyn Write,
    lifecycle: &mut Lifecycle,
) -> Result<ReturnCode, Die> {
    let usage = usage_of::<C>();

    // Unparsed -> Validated
    let argv = std::iter::once(C::NAME.to_string()).chain(args.iter().cloned());
    let parsed = C::Args::try_parse_from(argv).map_err(|e| parse_error(&e, &usage))?;
    lifecycle.advance(Phase::Validated)?;

    let common = parsed.common().clone();
    let mut report = Report::new(out, Verbosity::from_flags(common.quiet, common.debug));

    if common.help {
        report.line(help_of::<C>().trim_end());
        lifecycle.advance(Phase::Reported)?;
        report.flush().ok();
        return Ok(ReturnCode::Complete);
    }

    // Validated -> Built
    // The git directory must be fixed before any revision opens the repository.
    let mut repo = RepositoryResolver::new(ctx.base.clone());
    let git_dir = InvocationBuilder::new(ResolveContext::new(&ctx.base, &repo))
        .apply(ArgSpec::directory("git-dir", common.git_dir.clone()))?
        .build()
        .directory("git-dir")
        .map(Path::to_path_buf);
    if let Some(dir) = git_dir {
        repo.set_git_dir(dir)?;
    }

    let invocation = InvocationBuilder::new(ResolveContext::new(&ctx.base, &repo))
        .apply_all(command.specs(&parsed))
        .map_err(|e| {
            let wants_usage = e.wants_usage();
            let die = Die::from(e);
            if wants_usage {
                die.with_usage(usage.clone())
            } else {
                die
            }
        })?
        .build();

    let git = repo.resolve()?;
    report.debug(format!("repository: {}", git.git_dir().display()));

    let paths = git.paths();
    let config = Config::load(Some(&paths))?;
    let comparator = Comparator::from_config(&config);
    report.debug(format!("engine: {}", comparator.engine_name()));

    gate(git, command.requirements(&parsed))?;
    let _lock = if C::MUTATING {
        let lock = RepoLock::acquire(&paths)?;
        report.debug(format!("locked {}", lock.path().display()));
        Some(lock)
    } else {
        None
    };
    lifecycle.advance(Phase::Built)?;

    // Built -> Executed
    let outcome = {
        let mut execution = Execution {
            git,
            invocation: &invocation,
            config: &config,
            comparator: &comparator,
            report: &mut report,
        };
        command.execute(&mut execution, &parsed)?
    };
    lifecycle.advance(Phase::Executed)?;

    // Executed -> Reported
    report.debug(format!("outcome: {}", outcome.return_code()));
    // Write failures are recorded by the console and checked by the shell.
    report.flush().ok();
    lifecycle.advance(Phase::Reported)?;

    Ok(outcome.return_code())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod phase {
        use super::*;

        #[test]
        fn happy_path_order() {
            let mut lifecycle = Lifecycle::default();
            for phase in [
                Phase::Validated,
                Phase::Built,
                Phase::Executed,
                Phase::Reported,
            ] {
                lifecycle.advance(phase).unwrap();
            }
            assert!(lifecycle.phase().is_terminal());
        }

        #[test]
        fn skipping_a_phase_is_rejected() {
            let mut lifecycle = Lifecycle::default();
            let err = lifecycle.advance(Phase::Executed).unwrap_err();
            assert_eq!(
                err.message(),
                Some("illegal lifecycle transition unparsed -> executed")
            );
        }

        #[test]
        fn help_short_cut_allowed() {
            assert!(Phase::Validated.can_move_to(Phase::Reported));
            assert!(!Phase::Built.can_move_to(Phase::Reported));
        }

        #[test]
        fn failure_from_any_live_phase() {
            for phase in [
                Phase::Unparsed,
                Phase::Validated,
                Phase::Built,
                Phase::Executed,
            ] {
                assert!(phase.can_move_to(Phase::Failed));
            }
            assert!(!Phase::Reported.can_move_to(Phase::Failed));
        }

        #[test]
        fn fail_keeps_terminal_phase() {
            let mut lifecycle = Lifecycle::default();
            lifecycle.fail();
            assert_eq!(lifecycle.phase(), Phase::Failed);
            lifecycle.fail();
            assert_eq!(lifecycle.phase(), Phase::Failed);
        }
    }

    mod parse_errors {
        use super::*;

        #[derive(Debug, Parser)]
        #[command(name = "logicaltest", disable_help_flag = true)]
        struct Args {
            #[arg(long)]
            flag: bool,
            #[arg(value_name = "commit", required = true)]
            commit: Option<String>,
        }

        #[test]
        fn unknown_option_message() {
            let err = Args::try_parse_from(["logicaltest", "-c", "x"]).unwrap_err();
            let die = parse_error(&err, "logicaltest <commit>");
            assert_eq!(die.message(), Some("\"-c\" is not a valid option"));
            assert_eq!(die.usage(), Some("logicaltest <commit>"));
        }

        #[test]
        fn missing_argument_message() {
            let err = Args::try_parse_from(["logicaltest"]).unwrap_err();
            let die = parse_error(&err, "usage");
            assert_eq!(die.message(), Some("Argument \"commit\" is required"));
        }

        #[test]
        fn other_errors_use_first_line() {
            let err = Args::try_parse_from(["logicaltest", "--flag=maybe", "x"]).unwrap_err();
            let die = parse_error(&err, "usage");
            let message = die.message().unwrap();
            assert!(!message.starts_with("error: "));
            assert!(!message.contains('\n'));
        }
    }
}
