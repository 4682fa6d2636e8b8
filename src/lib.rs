//! logical-git - Model-aware diff, merge, cherry-pick and rebase for git
//!
//! The `logicalApp` binary adds "logical" variants of the git porcelain
//! commands that compare and merge model files by their content through a
//! comparison engine, instead of line by line.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Application shell, command registry and the commands
//! - [`engine`] - The command lifecycle: Parse → Resolve → Gate → Execute → Report
//! - [`core`] - Domain types, argument resolution, configuration, and operations
//! - [`git`] - Single interface for all Git operations
//! - [`compare`] - Snapshots and the comparison engines
//! - [`ui`] - Output sinks
//!
//! # Correctness Invariants
//!
//! 1. Nothing is mutated before arguments resolve and preconditions pass
//! 2. Every failure is a single typed death signal, printed in one place
//! 3. Buffered output is flushed on every exit path
//! 4. An interrupted replay always leaves a sequencer state to resume from

pub mod cli;
pub mod compare;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
