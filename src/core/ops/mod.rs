//! core::ops
//!
//! Locking and persisted operation state.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive repository lock
//! - [`sequencer`] - State of an interrupted cherry-pick or rebase
//!
//! # Architecture
//!
//! Every mutating command:
//! 1. Acquires the exclusive repo lock
//! 2. Refuses to start while a sequencer state exists
//! 3. Writes sequencer state before stopping on conflicts
//! 4. Removes the state once the operation completes or is aborted

pub mod lock;
pub mod sequencer;

pub use lock::{LockError, RepoLock};
pub use sequencer::{Operation, SequencerError, SequencerState};
