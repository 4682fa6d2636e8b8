//! cli::registry
//!
//! The process-wide table of logical commands.
//!
//! The table is built once, on first use, and never changes afterwards. It
//! stores factories rather than instances: every lookup returns a freshly
//! constructed command, so nothing leaks from one invocation to the next.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::engine::{LogicalCommand, Runnable};

use super::commands::{CherryPick, Diff, Merge, Mergetool, Rebase};

/// Builds a fresh command.
pub type Factory = fn() -> Box<dyn Runnable>;

fn factory<C: LogicalCommand + 'static>() -> Box<dyn Runnable> {
    Box::new(C::default())
}

fn register<C: LogicalCommand + 'static>(table: &mut BTreeMap<&'static str, Factory>) {
    table.insert(C::NAME, factory::<C>);
}

fn table() -> &'static BTreeMap<&'static str, Factory> {
    static TABLE: OnceLock<BTreeMap<&'static str, Factory>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = BTreeMap::new();
        register::<CherryPick>(&mut table);
        register::<Diff>(&mut table);
        register::<Merge>(&mut table);
        register::<Mergetool>(&mut table);
        register::<Rebase>(&mut table);
        table
    })
}

/// A new instance of the command registered as `name`.
///
/// Lookup is exact and case-sensitive.
pub fn create_command(name: &str) -> Option<Box<dyn Runnable>> {
    table().get(name).map(|make| make())
}

/// Registered command names, sorted.
pub fn available_commands() -> Vec<&'static str> {
    table().keys().copied().collect()
}
