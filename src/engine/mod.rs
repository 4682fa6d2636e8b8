//! engine
//!
//! Drives every logical command through one lifecycle.
//!
//! # Architecture
//!
//! The engine sits between the command-line shell and the commands:
//!
//! 1. **Parse**: clap turns raw arguments into the command's options
//! 2. **Resolve**: declared arguments become revisions, path filters and flags
//! 3. **Gate**: the command's preconditions are checked against the repository
//! 4. **Execute**: the command runs with an [`command::Execution`]
//! 5. **Report**: buffered output is flushed and the outcome becomes an exit code
//!
//! # Modules
//!
//! - [`command`] - The [`LogicalCommand`] trait and its object-safe face
//! - [`gate`] - Preconditions
//! - [`lifecycle`] - Phase tracking and the driver
//! - [`replay`] - Commit replay shared by cherry-pick and rebase
//!
//! # Invariants
//!
//! - Nothing is mutated before gating passes
//! - Mutating commands hold the repository lock for their whole execution
//! - Every failure leaves the lifecycle as a [`Die`](crate::core::signal::Die)

use std::path::PathBuf;

pub mod command;
pub mod gate;
pub mod lifecycle;
pub mod replay;

pub use command::{
    help_of, usage_of, CommandArgs, CommonArgs, Execution, LogicalCommand, Outcome, Runnable,
};
pub use gate::{gate, Requirement, RequirementSet};
pub use lifecycle::{Lifecycle, Phase};

/// Process-level facts shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Directory relative arguments are resolved against.
    pub base: PathBuf,
    /// Print the cause chain of failures.
    pub show_stack_trace: bool,
}

impl Context {
    pub fn new(base: PathBuf) -> Self {
        Self {
            base,
            show_stack_trace: false,
        }
    }

    /// Context rooted at the process's working directory.
    pub fn from_env() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn with_stack_trace(mut self, show: bool) -> Self {
        self.show_stack_trace = show;
        self
    }
}
