//! compare::external
//!
//! A comparison engine run as a separate program.
//!
//! Snapshots are written into a fresh temporary directory per call, then the
//! configured program is run with the directories as arguments:
//!
//! ```text
//! <command> <args...> compare <left> <right>
//! <command> <args...> merge <base> <ours> <theirs> <out>
//! ```
//!
//! `compare` prints one `<A|D|M> <path>` line per difference and exits 0.
//! `merge` writes merged files into `<out>` and exits 0 when clean, or 1 when
//! conflicts remain. On stdout, a `D <path>` line resolves a path as deleted
//! and, after exit 1, any other line names a conflicting path. Exit 1 with no
//! path named leaves every input path conflicted. A path that is neither in
//! `<out>` nor deleted stays unresolved. Any other exit is an engine failure.

use std::ffi::OsStr;
use std::process::{Command, Output};

use tempfile::TempDir;

use super::engine::{Change, ChangeKind, Comparison, ComparisonEngine, EngineError, MergeVerdict};
use super::snapshot::Snapshot;
use crate::core::config::EngineConfig;
use crate::core::pathfilter::PathFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEngine {
    command: String,
    args: Vec<String>,
}

impl ExternalEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }

    fn run<P: AsRef<OsStr>>(&self, mode: &str, dirs: &[P]) -> Result<Output, EngineError> {
        Command::new(&self.command)
            .args(&self.args)
            .arg(mode)
            .args(dirs)
            .output()
            .map_err(|source| EngineError::Spawn {
                command: self.command.clone(),
                source,
            })
    }

    fn failure(&self, output: &Output) -> EngineError {
        EngineError::Failed {
            command: self.command.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Parse one `<code> <path>` line of `compare` output.
fn parse_change(line: &str) -> Result<Change, EngineError> {
    let (code, path) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| EngineError::Protocol(line.to_string()))?;
    let kind = ChangeKind::from_code(code).ok_or_else(|| EngineError::Protocol(line.to_string()))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(EngineError::Protocol(line.to_string()));
    }
    Ok(Change {
        path: path.to_string(),
        kind,
    })
}

/// The path of a `D <path>` line of `merge` output.
fn parse_deletion(line: &str) -> Option<&str> {
    let (code, path) = line.split_once(char::is_whitespace)?;
    let path = path.trim();
    (code == "D" && !path.is_empty()).then_some(path)
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

impl ComparisonEngine for ExternalEngine {
    fn name(&self) -> &str {
        &self.command
    }

    fn compare(
        &self,
        left: &Snapshot,
        right: &Snapshot,
        filter: &PathFilter,
    ) -> Result<Comparison, EngineError> {
        let root = TempDir::new()?;
        let (left_dir, right_dir) = (root.path().join("left"), root.path().join("right"));
        left.write_to(&left_dir)?;
        right.write_to(&right_dir)?;

        let output = self.run("compare", &[&left_dir, &right_dir])?;
        if !output.status.success() {
            return Err(self.failure(&output));
        }

        let mut changes = Vec::new();
        for line in stdout_lines(&output) {
            let change = parse_change(&line)?;
            if filter.matches(&change.path) {
                changes.push(change);
            }
        }
        Ok(Comparison::new(changes))
    }

    fn merge(
        &self,
        base: &Snapshot,
        ours: &Snapshot,
        theirs: &Snapshot,
        filter: &PathFilter,
    ) -> Result<MergeVerdict, EngineError> {
        let root = TempDir::new()?;
        let dirs = ["base", "ours", "theirs", "out"].map(|name| root.path().join(name));
        base.write_to(&dirs[0])?;
        ours.write_to(&dirs[1])?;
        theirs.write_to(&dirs[2])?;
        std::fs::create_dir_all(&dirs[3])?;

        let output = self.run("merge", &dirs)?;
        let conflicted = match output.status.code() {
            Some(0) => false,
            Some(1) => true,
            _ => return Err(self.failure(&output)),
        };

        let mut deleted = Vec::new();
        let mut conflicts = Vec::new();
        for line in stdout_lines(&output) {
            match parse_deletion(&line) {
                Some(path) => deleted.push(path.to_string()),
                None if conflicted => conflicts.push(line),
                None => return Err(EngineError::Protocol(line)),
            }
        }
        deleted.retain(|path| filter.matches(path));
        conflicts.retain(|path| filter.matches(path));

        let merged = Snapshot::read_from("merged", &dirs[3])?.restrict(filter);
        if !conflicted {
            return Ok(MergeVerdict::clean(merged, deleted));
        }
        Ok(MergeVerdict {
            merged,
            deleted,
            conflicts,
            conflicted,
        })
    }
}
