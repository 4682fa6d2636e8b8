//! ui::output
//!
//! Output sinks and stream health.
//!
//! # Design
//!
//! All user-facing text flows through these types; nothing else prints.
//!
//! - [`CheckedWriter`] remembers whether any write or flush ever failed, so the
//!   application shell can detect partially-failed output at the very end.
//! - [`Console`] pairs the checked stdout and stderr writers of one run.
//! - [`Report`] is a command's buffered output sink. Buffered lines reach the
//!   underlying writer on [`Report::flush`] or when the report is dropped, so
//!   output written before a failure is never lost.

use std::fmt::Display;
use std::io::{self, Write};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - results only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// A writer that records whether it ever failed.
#[derive(Debug)]
pub struct CheckedWriter<W: Write> {
    inner: W,
    failed: bool,
}

impl<W: Write> CheckedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            failed: false,
        }
    }

    /// Whether any write or flush has failed.
    pub fn has_error(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CheckedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).inspect_err(|_| self.failed = true)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().inspect_err(|_| self.failed = true)
    }
}

/// The stdout and stderr of one run.
#[derive(Debug)]
pub struct Console<O: Write, E: Write> {
    pub out: CheckedWriter<O>,
    pub err: CheckedWriter<E>,
}

impl Console<io::Stdout, io::Stderr> {
    /// The process's standard streams.
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out: CheckedWriter::new(out),
            err: CheckedWriter::new(err),
        }
    }

    /// Whether either stream has failed.
    pub fn has_error(&self) -> bool {
        self.out.has_error() || self.err.has_error()
    }

    pub fn into_parts(self) -> (O, E) {
        (self.out.into_inner(), self.err.into_inner())
    }
}

/// Buffered per-command output sink.
pub struct Report<'a> {
    sink: &'a mut dyn Write,
    verbosity: Verbosity,
    buffer: Vec<String>,
}

impl std::fmt::Debug for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Report")
            .field("verbosity", &self.verbosity)
            .field("pending", &self.buffer.len())
            .finish()
    }
}

impl<'a> Report<'a> {
    pub fn new(sink: &'a mut dyn Write, verbosity: Verbosity) -> Self {
        Self {
            sink,
            verbosity,
            buffer: Vec::new(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// A result line, printed at every verbosity.
    pub fn line(&mut self, message: impl Display) {
        self.buffer.push(message.to_string());
    }

    /// A progress line, suppressed in quiet mode.
    pub fn info(&mut self, message: impl Display) {
        if self.verbosity != Verbosity::Quiet {
            self.buffer.push(message.to_string());
        }
    }

    /// A diagnostic line, only in debug mode.
    pub fn debug(&mut self, message: impl Display) {
        if self.verbosity == Verbosity::Debug {
            self.buffer.push(format!("debug: {}", message));
        }
    }

    /// Lines written but not yet flushed.
    pub fn pending(&self) -> &[String] {
        &self.buffer
    }

    /// Write all buffered lines to the sink.
    pub fn flush(&mut self) -> io::Result<()> {
        for line in self.buffer.drain(..) {
            writeln!(self.sink, "{}", line)?;
        }
        self.sink.flush()
    }
}

impl Drop for Report<'_> {
    fn drop(&mut self) {
        // A failure here is recorded by the CheckedWriter underneath.
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    mod verbosity {
        use super::*;

        #[test]
        fn quiet_wins_over_debug() {
            assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
            assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        }
    }

    mod checked_writer {
        use super::*;

        #[test]
        fn healthy_writer_has_no_error() {
            let mut writer = CheckedWriter::new(Vec::new());
            writeln!(writer, "hello").unwrap();
            assert!(!writer.has_error());
            assert_eq!(writer.into_inner(), b"hello\n");
        }

        #[test]
        fn failure_is_remembered() {
            let mut writer = CheckedWriter::new(Broken);
            assert!(writer.write_all(b"x").is_err());
            assert!(writer.has_error());
        }

        #[test]
        fn console_reports_either_stream() {
            let mut console = Console::new(Vec::new(), Broken);
            assert!(!console.has_error());
            let _ = console.err.write_all(b"x");
            assert!(console.has_error());
        }
    }

    mod report {
        use super::*;

        #[test]
        fn lines_flush_on_drop() {
            let mut out = Vec::new();
            {
                let mut report = Report::new(&mut out, Verbosity::Normal);
                report.line("first");
                report.info("second");
                assert_eq!(report.pending().len(), 2);
            }
            assert_eq!(String::from_utf8(out).unwrap(), "first\nsecond\n");
        }

        #[test]
        fn quiet_keeps_results_only() {
            let mut out = Vec::new();
            {
                let mut report = Report::new(&mut out, Verbosity::Quiet);
                report.line("result");
                report.info("progress");
                report.debug("detail");
            }
            assert_eq!(String::from_utf8(out).unwrap(), "result\n");
        }

        #[test]
        fn debug_lines_are_prefixed() {
            let mut out = Vec::new();
            {
                let mut report = Report::new(&mut out, Verbosity::Debug);
                report.debug("opened repository");
            }
            assert_eq!(
                String::from_utf8(out).unwrap(),
                "debug: opened repository\n"
            );
        }

        #[test]
        fn explicit_flush_empties_buffer() {
            let mut out = Vec::new();
            let mut report = Report::new(&mut out, Verbosity::Normal);
            report.line("a");
            report.flush().unwrap();
            assert!(report.pending().is_empty());
        }
    }
}
