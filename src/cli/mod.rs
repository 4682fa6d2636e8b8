//! cli
//!
//! Command-line interface layer for the logical commands.
//!
//! # Responsibilities
//!
//! - Parse the global flags and pick the command ([`shell`])
//! - Keep the table of commands ([`registry`])
//! - Define each command's options ([`args`]) and logic ([`commands`])
//! - Does NOT touch the repository outside a command's execution
//!
//! # Architecture
//!
//! The shell is thin. It hands the command's arguments to the
//! [`crate::engine`] lifecycle, which parses, resolves, gates and executes
//! them, and turns whatever comes back into the process exit code.

pub mod args;
pub mod commands;
pub mod registry;
pub mod shell;

pub use registry::{available_commands, create_command};

use crate::core::signal::ReturnCode;
use crate::engine::Context;
use crate::ui::output::Console;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> std::process::ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut console = Console::stdio();

    let code = match Context::from_env() {
        Ok(ctx) => shell::start(&args, &ctx, &mut console),
        Err(e) => {
            let die = crate::core::signal::Die::internal(e);
            shell::print_die(&die, false, &mut console);
            ReturnCode::Error
        }
    };
    code.into()
}
