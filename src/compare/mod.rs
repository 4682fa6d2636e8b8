//! compare
//!
//! The comparison and merge invocation layer.
//!
//! # Modules
//!
//! - [`snapshot`] - Owned, isolated model content of one side
//! - [`engine`] - The engine trait and its result types
//! - [`builtin`] - File-granularity engine used by default
//! - [`external`] - Engine run as a separate program
//! - [`invoke`] - Snapshot preparation and verdict application
//!
//! # Design
//!
//! Semantic model comparison is not implemented here. Engines are injected
//! behind [`ComparisonEngine`]; this layer only isolates each side's content
//! and translates results. Engine failures become software errors.

pub mod builtin;
pub mod engine;
pub mod external;
pub mod invoke;
pub mod snapshot;

pub use builtin::FileEngine;
pub use engine::{Change, ChangeKind, Comparison, ComparisonEngine, EngineError, MergeVerdict,
    Settled,
};
pub use external::ExternalEngine;
pub use invoke::{Comparator, ConflictReport};
pub use snapshot::{ModelScope, Snapshot};

use crate::core::signal::Die;

impl From<EngineError> for Die {
    fn from(err: EngineError) -> Self {
        Die::internal(err)
    }
}
