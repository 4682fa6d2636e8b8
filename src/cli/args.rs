//! cli::args
//!
//! Per-command argument definitions using clap derive.
//!
//! # Common Flags
//!
//! Every command flattens [`CommonArgs`]:
//! - `--git-dir <path>`: explicit repository location
//! - `--quiet` / `-q`: results only
//! - `--debug`: diagnostic output
//! - `--help` / `-h`: print the command's help
//!
//! clap's own help flag is disabled so that help goes through the lifecycle
//! and always returns COMPLETE. Positionals are optional here; required-ness
//! is enforced during argument resolution so that the message matches the
//! other resolution failures.

use clap::{ArgGroup, Parser};

use crate::engine::{CommandArgs, CommonArgs};

/// Show model changes between commits, or between a commit and the work tree.
#[derive(Parser, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct DiffArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Commit to compare from
    #[arg(value_name = "commit")]
    pub commit: Option<String>,

    /// Commit to compare with; the working tree when omitted
    #[arg(value_name = "compareWith")]
    pub compare_with: Option<String>,

    /// Limit the comparison to these paths
    #[arg(value_name = "path", last = true)]
    pub paths: Vec<String>,
}

/// Join a commit into the current branch.
#[derive(Parser, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct MergeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Commit to merge
    #[arg(value_name = "commit")]
    pub commit: Option<String>,

    /// Merge commit message
    #[arg(short = 'm', long = "message", value_name = "msg")]
    pub message: Option<String>,

    /// Always create a merge commit
    #[arg(long = "no-ff")]
    pub no_ff: bool,
}

/// Resolve conflicted model files with the comparison engine.
#[derive(Parser, Debug, Default)]
#[command(disable_help_flag = true)]
pub struct MergetoolArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Limit resolution to these paths
    #[arg(value_name = "path")]
    pub paths: Vec<String>,
}

/// Apply the changes introduced by existing commits.
#[derive(Parser, Debug, Default)]
#[command(disable_help_flag = true)]
#[command(group(ArgGroup::new("control").args(["continue_", "skip", "abort", "quit"])))]
pub struct CherryPickArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Commits to apply, in order
    #[arg(value_name = "commit")]
    pub commits: Vec<String>,

    /// Continue after resolving conflicts
    #[arg(long = "continue")]
    pub continue_: bool,

    /// Drop the commit that stopped and continue with the rest
    #[arg(long)]
    pub skip: bool,

    /// Return to the state before the cherry-pick started
    #[arg(long)]
    pub abort: bool,

    /// Forget the cherry-pick in progress, keeping HEAD where it is
    #[arg(long)]
    pub quit: bool,
}

impl CherryPickArgs {
    /// Whether a control flag replaces the commit list.
    pub fn is_control(&self) -> bool {
        self.continue_ || self.skip || self.abort || self.quit
    }
}

/// Reapply commits on top of another base.
#[derive(Parser, Debug, Default)]
#[command(disable_help_flag = true)]
#[command(group(ArgGroup::new("control").args(["continue_", "skip", "abort"])))]
pub struct RebaseArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Commit to replay onto; the branch's upstream when omitted
    #[arg(value_name = "upstream")]
    pub upstream: Option<String>,

    /// Branch to check out before rebasing
    #[arg(value_name = "branch")]
    pub branch: Option<String>,

    /// Continue after resolving conflicts
    #[arg(long = "continue")]
    pub continue_: bool,

    /// Drop the commit that stopped and continue with the rest
    #[arg(long)]
    pub skip: bool,

    /// Return to the state before the rebase started
    #[arg(long)]
    pub abort: bool,
}

impl RebaseArgs {
    pub fn is_control(&self) -> bool {
        self.continue_ || self.skip || self.abort
    }
}

macro_rules! common_args {
    ($($args:ty),*) => {
        $(impl CommandArgs for $args {
            fn common(&self) -> &CommonArgs {
                &self.common
            }
        })*
    };
}

common_args!(DiffArgs, MergeArgs, MergetoolArgs, CherryPickArgs, RebaseArgs);

#[cfg(test)]
mod tests {
    use super::*;

    mod diff {
        use super::*;

        #[test]
        fn paths_after_separator() {
            let args =
                DiffArgs::try_parse_from(["logicaldiff", "HEAD~1", "--", "a.uml", "m/"]).unwrap();
            assert_eq!(args.commit.as_deref(), Some("HEAD~1"));
            assert_eq!(args.compare_with, None);
            assert_eq!(args.paths, vec!["a.uml", "m/"]);
        }

        #[test]
        fn two_revisions() {
            let args = DiffArgs::try_parse_from(["logicaldiff", "a", "b"]).unwrap();
            assert_eq!(args.compare_with.as_deref(), Some("b"));
        }

        #[test]
        fn missing_commit_parses() {
            let args = DiffArgs::try_parse_from(["logicaldiff"]).unwrap();
            assert!(args.commit.is_none());
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn message_and_no_ff() {
            let args =
                MergeArgs::try_parse_from(["logicalmerge", "-m", "msg", "--no-ff", "topic"])
                    .unwrap();
            assert_eq!(args.message.as_deref(), Some("msg"));
            assert!(args.no_ff);
            assert_eq!(args.commit.as_deref(), Some("topic"));
        }
    }

    mod control_flags {
        use super::*;

        #[test]
        fn cherry_pick_control_flags_exclusive() {
            assert!(
                CherryPickArgs::try_parse_from(["logicalcherry-pick", "--continue", "--abort"])
                    .is_err()
            );
            let args = CherryPickArgs::try_parse_from(["logicalcherry-pick", "--quit"]).unwrap();
            assert!(args.is_control());
        }

        #[test]
        fn rebase_control_flags_exclusive() {
            assert!(RebaseArgs::try_parse_from(["logicalrebase", "--skip", "--abort"]).is_err());
            let args = RebaseArgs::try_parse_from(["logicalrebase", "main"]).unwrap();
            assert!(!args.is_control());
        }

        #[test]
        fn rebase_has_no_quit() {
            assert!(RebaseArgs::try_parse_from(["logicalrebase", "--quit"]).is_err());
        }
    }

    #[test]
    fn common_flags_everywhere() {
        let args = MergetoolArgs::try_parse_from(["logicalmergetool", "-q", "-h"]).unwrap();
        assert!(args.common().quiet);
        assert!(args.common().help);
    }
}
