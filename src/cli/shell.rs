//! cli::shell
//!
//! The top-level application shell.
//!
//! # Responsibilities
//!
//! - Parse the global flags and the command name
//! - Hand the remaining arguments, verbatim, to the selected command
//! - Be the single place where a [`Die`] is printed and becomes an exit code
//! - Force ERROR when stdout or stderr failed at any point
//!
//! The global grammar is tiny and its output is a fixed contract, so it is
//! parsed by hand rather than with clap:
//!
//! ```text
//! logicalApp [--help|-h] [--show-stack-trace] [--git-dir <path>] <command> [ARGS...]
//! ```

use std::io::Write;

use crate::core::signal::{Die, ReturnCode};
use crate::engine::Context;
use crate::ui::output::Console;

use super::registry::{available_commands, create_command};

/// Usage line of the shell itself.
pub const USAGE: &str = "logicalApp --help (-h) command [ARG ...]";

const HELP_OPTION: &str = " --help (-h) : Displays help for this command.";

/// What the global arguments asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// No arguments at all.
    Empty,
    /// `--help` anywhere before the command name.
    Help,
    /// Run `command` with `args`.
    Run {
        command: String,
        args: Vec<String>,
        show_stack_trace: bool,
    },
}

/// Parse the global arguments.
///
/// # Errors
///
/// A fatal [`Die`] for an unknown option or a missing `--git-dir` value.
/// Command names are not looked up here.
pub fn parse(args: &[String]) -> Result<Parsed, Die> {
    if args.is_empty() {
        return Ok(Parsed::Empty);
    }

    let mut show_stack_trace = false;
    let mut forwarded = Vec::new();
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        match token.as_str() {
            "--help" | "-h" => return Ok(Parsed::Help),
            "--show-stack-trace" => show_stack_trace = true,
            "--git-dir" => {
                let value = tokens
                    .next()
                    .ok_or_else(|| Die::fatal("Option \"--git-dir\" takes an operand"))?;
                forwarded.push(format!("--git-dir={}", value));
            }
            t if t.starts_with("--git-dir=") => forwarded.push(t.to_string()),
            t if t.starts_with('-') => {
                return Err(Die::fatal(format!("\"{}\" is not a valid option", t)));
            }
            command => {
                forwarded.extend(tokens.cloned());
                return Ok(Parsed::Run {
                    command: command.to_string(),
                    args: forwarded,
                    show_stack_trace,
                });
            }
        }
    }

    // Only global flags, no command name.
    Err(Die::fatal("Argument \"command\" is required").with_usage(USAGE))
}

/// Full help text.
pub fn help_text() -> String {
    let mut text = format!("{}\n\n{}\n\n", USAGE, HELP_OPTION);
    text.push_str(&command_list());
    text
}

fn command_list() -> String {
    let mut list = String::from("Available commands are:\n");
    for name in available_commands() {
        list.push_str(name);
        list.push('\n');
    }
    list
}

/// Print `die` the one way every failure is printed.
pub fn print_die<O: Write, E: Write>(
    die: &Die,
    show_stack_trace: bool,
    console: &mut Console<O, E>,
) {
    let stream: &mut dyn Write = if die.severity().to_stderr() {
        &mut console.err
    } else {
        &mut console.out
    };
    // Failures are recorded by the checked writers and checked by start().
    if let Some(message) = die.message() {
        let _ = writeln!(stream, "{}{}", die.severity().prefix(), message);
    }
    if let Some(usage) = die.usage() {
        let _ = writeln!(stream, "usage: {}", usage);
    }
    if show_stack_trace {
        if let Some(cause) = die.cause() {
            let _ = writeln!(stream, "{:?}", cause);
        }
    }
    let _ = stream.flush();
}

/// Run the shell on `args` (without the program name) and return the exit code.
pub fn start<O: Write, E: Write>(
    args: &[String],
    ctx: &Context,
    console: &mut Console<O, E>,
) -> ReturnCode {
    let mut show_stack_trace = ctx.show_stack_trace;
    let result = parse(args).and_then(|parsed| {
        if let Parsed::Run {
            show_stack_trace: true,
            ..
        } = parsed
        {
            show_stack_trace = true;
        }
        dispatch(parsed, &ctx.clone().with_stack_trace(show_stack_trace), console)
    });

    let mut code = match result {
        Ok(code) => code,
        Err(die) => {
            print_die(&die, show_stack_trace, console);
            ReturnCode::Error
        }
    };

    if console.has_error() {
        let _ = writeln!(console.err, "Unknown error");
        code = ReturnCode::Error;
    }
    code
}

fn dispatch<O: Write, E: Write>(
    parsed: Parsed,
    ctx: &Context,
    console: &mut Console<O, E>,
) -> Result<ReturnCode, Die> {
    match parsed {
        Parsed::Empty => Err(Die::fatal(format!("{}\n{}", USAGE, command_list()))),
        Parsed::Help => {
            // Recorded by the checked writer on failure.
            let _ = console.out.write_all(help_text().as_bytes());
            let _ = console.out.flush();
            Ok(ReturnCode::Complete)
        }
        Parsed::Run { command, args, .. } => {
            let runnable = create_command(&command)
                .ok_or_else(|| Die::fatal(format!("Not a logical command {}", command)))?;
            runnable.run(ctx, &args, &mut console.out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    mod parsing {
        use super::*;

        #[test]
        fn empty() {
            assert_eq!(parse(&[]).unwrap(), Parsed::Empty);
        }

        #[test]
        fn help_wins_over_command() {
            assert_eq!(parse(&strings(&["-h", "logicaldiff"])).unwrap(), Parsed::Help);
            assert_eq!(parse(&strings(&["--help", "nope"])).unwrap(), Parsed::Help);
        }

        #[test]
        fn command_args_are_verbatim() {
            let parsed = parse(&strings(&["logicaldiff", "-h", "--weird", "x"])).unwrap();
            assert_eq!(
                parsed,
                Parsed::Run {
                    command: "logicaldiff".into(),
                    args: strings(&["-h", "--weird", "x"]),
                    show_stack_trace: false,
                }
            );
        }

        #[test]
        fn global_git_dir_forwarded_first() {
            let parsed = parse(&strings(&[
                "--show-stack-trace",
                "--git-dir",
                "../r/.git",
                "logicaldiff",
                "HEAD",
            ]))
            .unwrap();
            assert_eq!(
                parsed,
                Parsed::Run {
                    command: "logicaldiff".into(),
                    args: strings(&["--git-dir=../r/.git", "HEAD"]),
                    show_stack_trace: true,
                }
            );
        }

        #[test]
        fn unknown_option() {
            let die = parse(&strings(&["-c"])).unwrap_err();
            assert_eq!(die.message(), Some("\"-c\" is not a valid option"));
        }
    }

    #[test]
    fn help_text_layout() {
        let help = help_text();
        assert!(help.starts_with(
            "logicalApp --help (-h) command [ARG ...]\n\n --help (-h) : Displays help for this command.\n\nAvailable commands are:\n"
        ));
        assert!(help.ends_with("logicalrebase\n"));
    }

    #[test]
    fn software_errors_go_to_stderr() {
        let mut console = Console::new(Vec::new(), Vec::new());
        print_die(&Die::software("boom"), false, &mut console);
        let (out, err) = console.into_parts();
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(err).unwrap(), "software error: boom\n");
    }

    #[test]
    fn usage_follows_message() {
        let mut console = Console::new(Vec::new(), Vec::new());
        let die = Die::fatal("bad revision 'x'.").with_usage("logicaldiff <commit>");
        print_die(&die, false, &mut console);
        let (out, _) = console.into_parts();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "fatal: bad revision 'x'.\nusage: logicaldiff <commit>\n"
        );
    }

    #[test]
    fn cause_only_with_stack_trace() {
        let die = Die::fatal("outer").with_cause(anyhow::anyhow!("inner cause"));

        let mut console = Console::new(Vec::new(), Vec::new());
        print_die(&die, false, &mut console);
        let (out, _) = console.into_parts();
        assert_eq!(String::from_utf8(out).unwrap(), "fatal: outer\n");

        let mut console = Console::new(Vec::new(), Vec::new());
        print_die(&die, true, &mut console);
        let (out, _) = console.into_parts();
        assert!(String::from_utf8(out).unwrap().contains("inner cause"));
    }
}
