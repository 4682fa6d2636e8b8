//! core
//!
//! Core domain types, argument resolution, and operation state.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, RefName, etc.
//! - [`signal`] - Death signals, severities and return codes
//! - [`pathfilter`] - Path normalization and repository path filters
//! - [`resolve`] - Argument kinds and their resolvers
//! - [`invocation`] - Declared arguments and the validated invocation
//! - [`ops`] - Repository locking and sequencer state
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for on-disk state
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Resolution is fail-fast: a value is fully resolved or not produced
//! - Nothing reads ambient process state; base directories are explicit

pub mod config;
pub mod invocation;
pub mod ops;
pub mod pathfilter;
pub mod paths;
pub mod resolve;
pub mod signal;
pub mod types;
