//! core::signal
//!
//! The failure channel and the process exit code.
//!
//! # Types
//!
//! - [`ReturnCode`] - The only value that crosses the process boundary
//! - [`Severity`] - How bad a failure is, which decides prefix and stream
//! - [`Die`] - A typed failure raised anywhere in a command's lifecycle
//!
//! # Propagation
//!
//! A `Die` is created at the point of failure and propagated with `?` without
//! recovery. The application shell is the single place that consumes it,
//! prints it, and turns it into [`ReturnCode::Error`].
//!
//! # Example
//!
//! ```
//! use logical_git::core::signal::{Die, ReturnCode, Severity};
//!
//! let die = Die::fatal("cannot find repository");
//! assert_eq!(die.severity(), Severity::Fatal);
//! assert_eq!(die.severity().prefix(), "fatal: ");
//! assert_eq!(ReturnCode::Error.code(), 128);
//! ```

use std::fmt;

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnCode {
    /// The command ran to completion.
    Complete,
    /// The command stopped on unresolved conflicts.
    Aborted,
    /// The command failed.
    Error,
}

impl ReturnCode {
    /// Numeric exit status.
    pub fn code(self) -> u8 {
        match self {
            ReturnCode::Complete => 0,
            ReturnCode::Aborted => 1,
            ReturnCode::Error => 128,
        }
    }
}

impl From<ReturnCode> for std::process::ExitCode {
    fn from(code: ReturnCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnCode::Complete => "COMPLETE",
            ReturnCode::Aborted => "ABORTED",
            ReturnCode::Error => "ERROR",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Severity of a [`Die`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Malformed input found before anything was mutated.
    Error,
    /// A precondition the command cannot proceed without.
    Fatal,
    /// An unexpected failure: a bug or a broken environment.
    Software,
}

impl Severity {
    /// Message prefix for this severity.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::Error => "error: ",
            Severity::Fatal => "fatal: ",
            Severity::Software => "software error: ",
        }
    }

    /// Whether messages of this severity go to stderr instead of stdout.
    pub fn to_stderr(self) -> bool {
        matches!(self, Severity::Software)
    }
}

/// A failure that ends the current command.
///
/// Carries a severity, an optional message, an optional wrapped cause (shown
/// only with `--show-stack-trace`) and, for argument errors, the owning
/// command's usage text.
#[derive(Debug)]
pub struct Die {
    severity: Severity,
    message: Option<String>,
    cause: Option<anyhow::Error>,
    usage: Option<String>,
}

impl Die {
    fn with_severity(severity: Severity, message: Option<String>) -> Self {
        Self {
            severity,
            message,
            cause: None,
            usage: None,
        }
    }

    /// A recoverable user error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, Some(message.into()))
    }

    /// A fatal precondition failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Fatal, Some(message.into()))
    }

    /// An internal software error with a message.
    pub fn software(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Software, Some(message.into()))
    }

    /// An internal software error whose message is the cause's own.
    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        let cause = cause.into();
        Self {
            severity: Severity::Software,
            message: Some(cause.to_string()),
            cause: Some(cause),
            usage: None,
        }
    }

    /// A failure of the given severity without any message.
    pub fn silent(severity: Severity) -> Self {
        Self::with_severity(severity, None)
    }

    /// Attach a wrapped cause.
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Attach the usage text of the command whose arguments were rejected.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }

    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity.prefix())?;
        match (&self.message, &self.cause) {
            (Some(message), _) => write!(f, "{}", message),
            (None, Some(cause)) => write!(f, "{}", cause),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for Die {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_ref()?.as_ref();
        Some(cause)
    }
}
