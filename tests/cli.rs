//! Tests of the built binary: exit codes and stream routing.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn logical_app(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("logical-app").unwrap();
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn help_exits_zero() {
    let dir = TempDir::new().unwrap();
    logical_app(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "logicalApp --help (-h) command [ARG ...]\n",
        ))
        .stdout(predicate::str::contains("logicalrebase\n"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn no_arguments_exit_128() {
    let dir = TempDir::new().unwrap();
    logical_app(&dir)
        .assert()
        .code(128)
        .stdout(predicate::str::starts_with("fatal: logicalApp"));
}

#[test]
fn unknown_command_exit_128() {
    let dir = TempDir::new().unwrap();
    logical_app(&dir)
        .arg("wrongCmd")
        .assert()
        .code(128)
        .stdout("fatal: Not a logical command wrongCmd\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn outside_repository_exit_128() {
    let dir = TempDir::new().unwrap();
    logical_app(&dir)
        .args(["logicalmergetool"])
        .assert()
        .code(128)
        .stdout("fatal: cannot find repository\n");
}

#[test]
fn conflict_exits_one() {
    let dir = TempDir::new().unwrap();
    let git = |args: &[&str]| {
        let status = std::process::Command::new("git")
            .args(args)
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success(), "git {:?}", args);
    };
    git(&["init", "-q", "-b", "main"]);
    git(&["config", "user.email", "test@example.com"]);
    git(&["config", "user.name", "Test User"]);
    std::fs::write(dir.path().join("m.uml"), "base\n").unwrap();
    git(&["add", "."]);
    git(&["commit", "-q", "-m", "base"]);
    git(&["checkout", "-q", "-b", "topic"]);
    std::fs::write(dir.path().join("m.uml"), "topic\n").unwrap();
    git(&["commit", "-q", "-am", "topic"]);
    git(&["checkout", "-q", "main"]);
    std::fs::write(dir.path().join("m.uml"), "main\n").unwrap();
    git(&["commit", "-q", "-am", "main"]);

    logical_app(&dir)
        .args(["logicalmerge", "topic"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Merge conflict in m.uml"));
}
