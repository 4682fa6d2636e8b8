//! Integration tests for repository and argument resolution.
//!
//! These tests use real git repositories created via tempfile to verify that
//! resolution behaves the same way git itself does.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use logical_git::core::invocation::{ArgSpec, InvocationBuilder};
use logical_git::core::pathfilter::normalize;
use logical_git::core::resolve::{resolve_revision, ArgError, ResolveContext, ResolvedRef};
use logical_git::git::{Git, RepositoryError, RepositoryResolver};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with two commits on main.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init", "-q", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        let repo = Self { dir };
        repo.commit_file("model.uml", "<uml/>\n", "Initial commit");
        repo.commit_file("model.uml", "<uml name=\"a\"/>\n", "Name the model");
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    fn commit_file(&self, path: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-q", "-m", message]);
    }

    /// Output of `git rev-parse <rev>`.
    fn rev_parse(&self, rev: &str) -> String {
        let output = Command::new("git")
            .args(["rev-parse", rev])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

// =============================================================================
// Reference resolution
// =============================================================================

mod revisions {
    use super::*;

    #[test]
    fn branch_name_resolves_to_ref() {
        let repo = TestRepo::new();
        let resolved = resolve_revision(&repo.git(), "main").unwrap();
        match resolved {
            ResolvedRef::Ref { name, commit } => {
                assert_eq!(name.as_str(), "refs/heads/main");
                assert_eq!(commit.as_str(), repo.rev_parse("main"));
            }
            other => panic!("expected a ref, got {other:?}"),
        }
    }

    #[test]
    fn relative_expression_resolves_to_commit() {
        let repo = TestRepo::new();
        let resolved = resolve_revision(&repo.git(), "HEAD~1").unwrap();
        assert_eq!(
            resolved.commit().unwrap().as_str(),
            repo.rev_parse("HEAD~1")
        );
    }

    #[test]
    fn short_and_full_hash_agree() {
        let repo = TestRepo::new();
        let full = repo.rev_parse("HEAD");
        let git = repo.git();

        let from_full = resolve_revision(&git, &full).unwrap();
        let from_short = resolve_revision(&git, &full[..7]).unwrap();
        assert_eq!(from_full.commit(), from_short.commit());
        assert_eq!(from_full.commit().unwrap().as_str(), full);
    }

    #[test]
    fn unknown_token_is_bad_revision() {
        let repo = TestRepo::new();
        let err = resolve_revision(&repo.git(), "no-such-thing").unwrap_err();
        assert!(matches!(err, ArgError::BadRevision(_)));
        assert_eq!(err.to_string(), "bad revision 'no-such-thing'.");
    }

    #[test]
    fn tree_is_not_a_commit() {
        let repo = TestRepo::new();
        let tree = repo.rev_parse("HEAD^{tree}");
        let err = resolve_revision(&repo.git(), &tree).unwrap_err();
        assert!(matches!(err, ArgError::NotACommit(_)));
    }

    #[test]
    fn annotated_tag_peels_to_commit() {
        let repo = TestRepo::new();
        run_git(repo.path(), &["tag", "-a", "v1", "-m", "release"]);
        let resolved = resolve_revision(&repo.git(), "v1").unwrap();
        assert_eq!(resolved.commit().unwrap().as_str(), repo.rev_parse("HEAD"));
        assert_eq!(resolved.label(), "v1");
    }
}

// =============================================================================
// Repository resolver
// =============================================================================

mod repository {
    use super::*;

    #[test]
    fn resolves_once() {
        let repo = TestRepo::new();
        let resolver = RepositoryResolver::new(repo.path().to_path_buf());
        let first = resolver.resolve().unwrap() as *const Git;
        let second = resolver.resolve().unwrap() as *const Git;
        assert_eq!(first, second);
        assert!(resolver.is_open());
    }

    #[test]
    fn searches_upward_from_subdirectory() {
        let repo = TestRepo::new();
        let sub = repo.path().join("nested/deeper");
        std::fs::create_dir_all(&sub).unwrap();
        let resolver = RepositoryResolver::new(sub);
        let git = resolver.resolve().unwrap();
        assert_eq!(
            git.work_dir().unwrap().canonicalize().unwrap(),
            repo.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn relative_git_dir_is_normalized() {
        let repo = TestRepo::new();
        let sub = repo.path().join("sub");
        std::fs::create_dir_all(&sub).unwrap();

        let mut resolver = RepositoryResolver::new(sub.clone());
        resolver
            .set_git_dir(normalize(&sub, "./../.git"))
            .unwrap();
        assert_eq!(resolver.git_dir(), Some(repo.path().join(".git").as_path()));
        assert!(resolver.resolve().is_ok());
    }

    #[test]
    fn git_dir_fixed_once_open() {
        let repo = TestRepo::new();
        let mut resolver = RepositoryResolver::new(repo.path().to_path_buf());
        resolver.resolve().unwrap();
        assert_eq!(
            resolver.set_git_dir(repo.path().join(".git")),
            Err(RepositoryError::AlreadyOpen)
        );
    }
}

// =============================================================================
// Invocation building
// =============================================================================

mod invocation {
    use super::*;

    #[test]
    fn specs_resolve_in_order() {
        let repo = TestRepo::new();
        let resolver = RepositoryResolver::new(repo.path().to_path_buf());
        let invocation = InvocationBuilder::new(ResolveContext::new(repo.path(), &resolver))
            .apply_all(vec![
                ArgSpec::revision("commit", Some("HEAD~1".into())).required(),
                ArgSpec::revision("compareWith", None),
                ArgSpec::paths("path", vec!["model.uml".into()]),
            ])
            .unwrap()
            .build();

        assert!(invocation.revision("commit").is_some());
        assert!(invocation.revision("compareWith").is_none());
        let filter = invocation.paths("path");
        assert!(filter.matches("model.uml"));
        assert!(!filter.matches("other.uml"));
    }

    #[test]
    fn first_failure_stops_resolution() {
        let repo = TestRepo::new();
        let resolver = RepositoryResolver::new(repo.path().to_path_buf());
        let err = InvocationBuilder::new(ResolveContext::new(repo.path(), &resolver))
            .apply_all(vec![
                ArgSpec::revision("commit", Some("bogus".into())),
                ArgSpec::revision("compareWith", None).required(),
            ])
            .unwrap_err();
        assert_eq!(err.to_string(), "bad revision 'bogus'.");
    }

    #[test]
    fn path_outside_work_tree() {
        let repo = TestRepo::new();
        let resolver = RepositoryResolver::new(repo.path().to_path_buf());
        let err = InvocationBuilder::new(ResolveContext::new(repo.path(), &resolver))
            .apply(ArgSpec::paths("path", vec!["../elsewhere.uml".into()]))
            .unwrap_err();
        assert!(matches!(err, ArgError::OutsideRepository(_)));
    }
}
