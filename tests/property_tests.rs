//! Property-based tests for path handling.

use std::path::{Component, Path};

use proptest::prelude::*;

use logical_git::core::pathfilter::{normalize, PathFilter};

/// Path segments, including `.` and `..`.
fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => "[a-z]{1,6}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
    ]
}

fn relative_token() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..6).prop_map(|parts| parts.join("/"))
}

/// Plain repository-relative paths.
fn repo_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,6}", 1..5).prop_map(|parts| parts.join("/"))
}

proptest! {
    #[test]
    fn normalize_leaves_no_dot_components(token in relative_token()) {
        let normalized = normalize(Path::new("/work/tree"), &token);
        prop_assert!(normalized.is_absolute());
        prop_assert!(normalized
            .components()
            .all(|c| !matches!(c, Component::CurDir | Component::ParentDir)));
    }

    #[test]
    fn normalize_is_idempotent(token in relative_token()) {
        let once = normalize(Path::new("/work/tree"), &token);
        let twice = normalize(Path::new("/elsewhere"), &once.to_string_lossy());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filter_matches_its_prefix_and_children(prefix in repo_path(), child in repo_path()) {
        let root = Path::new("/work/tree");
        let filter = PathFilter::from_tokens(root, root, &[prefix.clone()]).unwrap();
        prop_assert!(filter.matches(&prefix));
        let nested = format!("{}/{}", prefix, child);
        prop_assert!(filter.matches(&nested));
    }

    #[test]
    fn filter_rejects_sibling_with_shared_prefix(prefix in repo_path()) {
        let root = Path::new("/work/tree");
        let filter = PathFilter::from_tokens(root, root, &[prefix.clone()]).unwrap();
        let sibling = format!("{}x", prefix);
        prop_assert!(!filter.matches(&sibling));
    }

    #[test]
    fn parent_escapes_are_rejected(depth in 3usize..6) {
        let root = Path::new("/work/tree");
        let token = vec![".."; depth].join("/");
        prop_assert!(PathFilter::from_tokens(root, root, &[token]).is_err());
    }
}
