//! core::pathfilter
//!
//! Repository path filters and lexical path normalization.
//!
//! A [`PathFilter`] is built from command-line path tokens. Each token is
//! resolved against a base directory, normalized, and made relative to the
//! work tree. A repository path matches when it equals one of the filter
//! prefixes or lies inside one of them.
//!
//! # Example
//!
//! ```
//! use logical_git::core::pathfilter::PathFilter;
//! use std::path::Path;
//!
//! let filter = PathFilter::from_tokens(
//!     Path::new("/work/repo/models"),
//!     Path::new("/work/repo"),
//!     &["library".to_string()],
//! ).unwrap();
//!
//! assert!(filter.matches("models/library/books.ecore"));
//! assert!(!filter.matches("models/libraryx.ecore"));
//! ```

use std::path::{Component, Path, PathBuf};

/// A token pointed outside the work tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsideWorkTree(pub String);

/// Resolve `token` against `base`, collapsing `.` and `..` lexically.
///
/// The filesystem is never consulted. `..` at the root stays at the root.
///
/// ```
/// use logical_git::core::pathfilter::normalize;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize(Path::new("/a/b"), "../c/./d"), PathBuf::from("/a/c/d"));
/// assert_eq!(normalize(Path::new("/a"), "/x/../y"), PathBuf::from("/y"));
/// ```
pub fn normalize(base: &Path, token: &str) -> PathBuf {
    let joined = if Path::new(token).is_absolute() {
        PathBuf::from(token)
    } else {
        base.join(token)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Slash-separated form of a relative path.
fn to_repo_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// A predicate over repository-relative, slash-separated paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    prefixes: Vec<String>,
}

impl PathFilter {
    /// A filter that matches every path.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from path tokens, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns the offending token if it resolves outside `work_dir`.
    pub fn from_tokens(
        base: &Path,
        work_dir: &Path,
        tokens: &[String],
    ) -> Result<Self, OutsideWorkTree> {
        let root = normalize(work_dir, ".");
        let mut prefixes = Vec::with_capacity(tokens.len());

        for token in tokens {
            let absolute = normalize(base, token);
            let relative = absolute
                .strip_prefix(&root)
                .map_err(|_| OutsideWorkTree(token.clone()))?;
            prefixes.push(to_repo_path(relative));
        }

        Ok(Self { prefixes })
    }

    /// Whether this filter matches everything.
    pub fn is_all(&self) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(String::is_empty)
    }

    /// Repository-relative prefixes, in the order given.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.is_all() {
            return true;
        }
        self.prefixes.iter().any(|prefix| {
            path == prefix
                || (path.starts_with(prefix.as_str())
                    && path.as_bytes().get(prefix.len()) == Some(&b'/'))
        })
    }
}
