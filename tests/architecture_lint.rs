//! Architecture enforcement tests.
//!
//! Commands must go through the command lifecycle: they do not touch git2,
//! gate themselves, or print outside of their report. These tests catch
//! violations in CI.
//!
//! # Test Categories
//!
//! 1. **Git isolation** - Only `src/git/` may use git2
//! 2. **Lifecycle bypass** - Commands must not gate or print directly
//! 3. **Registration** - Every command is registered and implements the trait
//! 4. **Headers** - Command modules open with their module path

use std::fs;
use std::path::{Path, PathBuf};

/// Files in the commands directory that are not commands.
const EXCLUDED_COMMANDS: &[&str] = &["mod.rs"];

/// Command files and the type each must define.
const COMMANDS: &[(&str, &str)] = &[
    ("cherry_pick.rs", "CherryPick"),
    ("diff.rs", "Diff"),
    ("merge.rs", "Merge"),
    ("mergetool.rs", "Mergetool"),
    ("rebase.rs", "Rebase"),
];

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files
}

fn command_files() -> Vec<PathBuf> {
    rust_files(Path::new("src/cli/commands"))
        .into_iter()
        .filter(|path| {
            let name = path.file_name().unwrap().to_str().unwrap();
            !EXCLUDED_COMMANDS.contains(&name)
        })
        .collect()
}

// =============================================================================
// Git isolation
// =============================================================================

/// git2 stays behind the `Git` interface.
#[test]
fn git2_only_used_in_git_module() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        if path.starts_with("src/git") {
            continue;
        }
        let content = fs::read_to_string(&path).unwrap();
        if content.contains("git2::") || content.contains("use git2") {
            violations.push(path.display().to_string());
        }
    }

    assert!(
        violations.is_empty(),
        "git2 used outside src/git:\n{}",
        violations.join("\n")
    );
}

// =============================================================================
// Lifecycle bypass
// =============================================================================

#[test]
fn commands_do_not_gate_themselves() {
    let mut violations = Vec::new();

    for path in command_files() {
        let content = fs::read_to_string(&path).unwrap();
        if content.contains("gate(") {
            violations.push(path.display().to_string());
        }
    }

    assert!(
        violations.is_empty(),
        "commands must declare requirements instead of gating:\n{}",
        violations.join("\n")
    );
}

#[test]
fn commands_print_through_report() {
    let mut violations = Vec::new();

    for path in command_files() {
        let content = fs::read_to_string(&path).unwrap();
        for needle in ["println!", "eprintln!", "print!(", "std::io::stdout", "std::process::exit"] {
            if content.contains(needle) {
                violations.push(format!("{}: {}", path.display(), needle));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "commands must write through their report:\n{}",
        violations.join("\n")
    );
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn every_command_implements_trait() {
    for (file, name) in COMMANDS {
        let path = Path::new("src/cli/commands").join(file);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
        assert!(
            content.contains(&format!("impl LogicalCommand for {}", name)),
            "{} must implement LogicalCommand",
            name
        );
    }
}

#[test]
fn every_command_is_registered() {
    let registry = fs::read_to_string("src/cli/registry.rs").unwrap();
    for (_, name) in COMMANDS {
        assert!(
            registry.contains(&format!("register::<{}>", name)),
            "{} is not registered",
            name
        );
    }
    assert_eq!(command_files().len(), COMMANDS.len());
}

// =============================================================================
// Headers
// =============================================================================

#[test]
fn command_modules_name_their_path() {
    for path in command_files() {
        let stem = path.file_stem().unwrap().to_str().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let expected = format!("//! cli::commands::{}\n//!\n", stem);
        assert!(
            content.starts_with(&expected),
            "{} must open with \"//! cli::commands::{}\"",
            path.display(),
            stem
        );
    }
}
