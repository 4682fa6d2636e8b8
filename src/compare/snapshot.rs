//! compare::snapshot
//!
//! Isolated, owned views of model content.
//!
//! A [`Snapshot`] owns a copy of every file it holds, so inspecting or
//! handing one side to an engine can never affect another side. Which files
//! count as model files is decided by a [`ModelScope`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::core::config::Config;
use crate::core::pathfilter::PathFilter;
use crate::core::resolve::ResolvedRef;
use crate::git::{Git, GitError};

/// The set of file extensions treated as model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelScope {
    extensions: Vec<String>,
}

impl ModelScope {
    pub fn new(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.into().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.model_extensions())
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether `path` has one of the model extensions (case-insensitive).
    ///
    /// ```
    /// use logical_git::compare::ModelScope;
    ///
    /// let scope = ModelScope::new(["uml", "notation"]);
    /// assert!(scope.is_model("diagrams/Main.UML"));
    /// assert!(!scope.is_model("README.md"));
    /// assert!(!scope.is_model("uml"));
    /// ```
    pub fn is_model(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            _ => false,
        }
    }

    /// Whether `path` is a model file the filter selects.
    pub fn selects(&self, filter: &PathFilter, path: &str) -> bool {
        self.is_model(path) && filter.matches(path)
    }
}

/// Model files of one side of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    label: String,
    files: BTreeMap<String, Vec<u8>>,
}

impl Snapshot {
    pub fn empty(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn from_files(label: impl Into<String>, files: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            label: label.into(),
            files,
        }
    }

    /// Model content of a commit or of the work tree.
    pub fn of(
        git: &Git,
        side: &ResolvedRef,
        scope: &ModelScope,
        filter: &PathFilter,
    ) -> Result<Self, GitError> {
        let select = |path: &str| scope.selects(filter, path);
        let files = match side.commit() {
            Some(oid) => git.tree_files(oid, &select)?,
            None => git.worktree_files(&select)?,
        };
        Ok(Self::from_files(side.label(), files))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, content: Vec<u8>) {
        self.files.insert(path.into(), content);
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Keep only the paths `filter` matches.
    pub fn restrict(mut self, filter: &PathFilter) -> Self {
        self.files.retain(|path, _| filter.matches(path));
        self
    }

    /// Materialize every file under `dir`.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        for (path, content) in &self.files {
            let target = dir.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, content)?;
        }
        Ok(())
    }

    /// Read every file under `dir` into a snapshot.
    pub fn read_from(label: impl Into<String>, dir: &Path) -> io::Result<Self> {
        let mut snapshot = Self::empty(label);
        if dir.is_dir() {
            read_tree(dir, "", &mut snapshot.files)?;
        }
        Ok(snapshot)
    }
}

fn read_tree(dir: &Path, prefix: &str, files: &mut BTreeMap<String, Vec<u8>>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{}/{}", prefix, name)
        };
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            read_tree(&entry.path(), &path, files)?;
        } else if file_type.is_file() {
            files.insert(path, fs::read(entry.path())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod scope {
        use super::*;

        #[test]
        fn extensions_are_case_insensitive() {
            let scope = ModelScope::new(["ECORE"]);
            assert_eq!(scope.extensions(), &["ecore"]);
            assert!(scope.is_model("model/library.ecore"));
            assert!(scope.is_model("model/library.Ecore"));
        }

        #[test]
        fn hidden_file_without_stem_is_not_model() {
            let scope = ModelScope::new(["uml"]);
            assert!(!scope.is_model("dir/.uml"));
        }

        #[test]
        fn selects_combines_filter() {
            let scope = ModelScope::new(["uml"]);
            let filter = PathFilter::from_tokens(
                Path::new("/r"),
                Path::new("/r"),
                &["a".to_string()],
            )
            .unwrap();
            assert!(scope.selects(&filter, "a/x.uml"));
            assert!(!scope.selects(&filter, "b/x.uml"));
            assert!(!scope.selects(&filter, "a/x.txt"));
        }
    }

    mod snapshot {
        use super::*;

        #[test]
        fn owned_content_is_isolated() {
            let mut left = Snapshot::empty("left");
            left.insert("m.uml", b"one".to_vec());
            let mut right = left.clone();
            right.insert("m.uml", b"two".to_vec());

            assert_eq!(left.get("m.uml"), Some(&b"one"[..]));
            assert_eq!(right.get("m.uml"), Some(&b"two"[..]));
        }

        #[test]
        fn restrict_drops_unmatched_paths() {
            let mut snapshot = Snapshot::empty("s");
            snapshot.insert("a/x.uml", vec![]);
            snapshot.insert("b/y.uml", vec![]);
            let filter =
                PathFilter::from_tokens(Path::new("/r"), Path::new("/r"), &["b".to_string()])
                    .unwrap();

            let restricted = snapshot.restrict(&filter);
            assert_eq!(restricted.paths().collect::<Vec<_>>(), vec!["b/y.uml"]);
        }

        #[test]
        fn write_then_read_directory() {
            let dir = TempDir::new().unwrap();
            let mut snapshot = Snapshot::empty("s");
            snapshot.insert("nested/deep/model.ecore", b"<ecore/>".to_vec());
            snapshot.insert("top.uml", b"<uml/>".to_vec());

            snapshot.write_to(dir.path()).unwrap();
            let read = Snapshot::read_from("s", dir.path()).unwrap();
            assert_eq!(read, snapshot);
        }

        #[test]
        fn read_missing_directory_is_empty() {
            let dir = TempDir::new().unwrap();
            let read = Snapshot::read_from("s", &dir.path().join("absent")).unwrap();
            assert!(read.is_empty());
        }
    }
}
