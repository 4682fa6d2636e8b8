//! core::invocation
//!
//! The validated arguments of one command run.
//!
//! Commands declare their arguments as a list of [`ArgSpec`]s. An
//! [`InvocationBuilder`] resolves each spec in declared order through the
//! resolver table and freezes the results into an [`Invocation`], which is
//! immutable from then on.
//!
//! # Example
//!
//! ```ignore
//! let invocation = InvocationBuilder::new(ctx)
//!     .apply(ArgSpec::revision("commit", Some("main".into())).required())?
//!     .apply(ArgSpec::paths("paths", vec![]))?
//!     .build();
//!
//! let commit = invocation.revision("commit");
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::pathfilter::PathFilter;
use crate::core::resolve::{resolver_for, ArgError, ArgKind, ArgValue, ResolveContext, ResolvedRef};

/// One declared argument with the raw tokens given for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub tokens: Vec<String>,
    pub required: bool,
}

impl ArgSpec {
    pub fn new(name: &'static str, kind: ArgKind, tokens: Vec<String>) -> Self {
        Self {
            name,
            kind,
            tokens,
            required: false,
        }
    }

    pub fn revision(name: &'static str, token: Option<String>) -> Self {
        Self::new(name, ArgKind::Revision, token.into_iter().collect())
    }

    pub fn revisions(name: &'static str, tokens: Vec<String>) -> Self {
        Self::new(name, ArgKind::Revisions, tokens)
    }

    pub fn paths(name: &'static str, tokens: Vec<String>) -> Self {
        Self::new(name, ArgKind::Paths, tokens)
    }

    pub fn directory(name: &'static str, token: Option<String>) -> Self {
        Self::new(name, ArgKind::Directory, token.into_iter().collect())
    }

    pub fn flag(name: &'static str, present: bool) -> Self {
        let tokens = if present {
            vec![format!("--{}", name)]
        } else {
            Vec::new()
        };
        Self::new(name, ArgKind::Flag, tokens)
    }

    pub fn text(name: &'static str, token: Option<String>) -> Self {
        Self::new(name, ArgKind::Text, token.into_iter().collect())
    }

    /// Mark the argument as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Applies argument specs in order.
#[derive(Debug)]
pub struct InvocationBuilder<'a> {
    ctx: ResolveContext<'a>,
    values: BTreeMap<&'static str, ArgValue>,
}

impl<'a> InvocationBuilder<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self {
            ctx,
            values: BTreeMap::new(),
        }
    }

    /// Resolve one spec.
    ///
    /// Optional arguments given no tokens are left absent, except flags and
    /// path filters, which always have a value.
    ///
    /// # Errors
    ///
    /// - [`ArgError::Required`] for a missing required argument
    /// - Whatever the kind's resolver reports
    pub fn apply(mut self, spec: ArgSpec) -> Result<Self, ArgError> {
        if spec.tokens.is_empty() {
            if spec.required {
                return Err(ArgError::Required(spec.name.to_string()));
            }
            if !matches!(spec.kind, ArgKind::Flag | ArgKind::Paths) {
                return Ok(self);
            }
        }

        let value = resolver_for(spec.kind)(spec.name, &spec.tokens, &self.ctx)?;
        self.values.insert(spec.name, value);
        Ok(self)
    }

    /// Resolve every spec, stopping at the first failure.
    pub fn apply_all(self, specs: Vec<ArgSpec>) -> Result<Self, ArgError> {
        specs.into_iter().try_fold(self, InvocationBuilder::apply)
    }

    pub fn build(self) -> Invocation {
        Invocation {
            values: self.values,
        }
    }
}

/// Resolved arguments of one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    values: BTreeMap<&'static str, ArgValue>,
}

impl Invocation {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn revision(&self, name: &str) -> Option<&ResolvedRef> {
        match self.values.get(name) {
            Some(ArgValue::Revision(r)) => Some(r),
            _ => None,
        }
    }

    /// Resolved revisions in the order given; empty when absent.
    pub fn revisions(&self, name: &str) -> &[ResolvedRef] {
        match self.values.get(name) {
            Some(ArgValue::Revisions(refs)) => refs,
            _ => &[],
        }
    }

    /// The path filter, matching everything when absent.
    pub fn paths(&self, name: &str) -> PathFilter {
        match self.values.get(name) {
            Some(ArgValue::Paths(filter)) => filter.clone(),
            _ => PathFilter::all(),
        }
    }

    pub fn directory(&self, name: &str) -> Option<&Path> {
        match self.values.get(name) {
            Some(ArgValue::Directory(dir)) => Some(dir),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(ArgValue::Flag(true)))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::RepositoryResolver;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, RepositoryResolver) {
        let dir = TempDir::new().unwrap();
        let repo = RepositoryResolver::new(dir.path().join("no-repo"));
        (dir, repo)
    }

    #[test]
    fn missing_required_argument() {
        let (dir, repo) = fixture();
        let err = InvocationBuilder::new(ResolveContext::new(dir.path(), &repo))
            .apply(ArgSpec::revision("commit", None).required())
            .unwrap_err();
        assert_eq!(err.to_string(), "Argument \"commit\" is required");
    }

    #[test]
    fn optional_arguments_absent_but_flags_and_paths_present() {
        let (dir, repo) = fixture();
        let invocation = InvocationBuilder::new(ResolveContext::new(dir.path(), &repo))
            .apply_all(vec![
                ArgSpec::revision("compare-with", None),
                ArgSpec::text("message", None),
                ArgSpec::flag("no-ff", false),
                ArgSpec::paths("paths", vec![]),
            ])
            .unwrap()
            .build();

        assert!(invocation.revision("compare-with").is_none());
        assert!(invocation.text("message").is_none());
        assert!(invocation.get("message").is_none());
        assert_eq!(invocation.get("no-ff"), Some(&ArgValue::Flag(false)));
        assert!(invocation.paths("paths").is_all());
        assert!(invocation.revisions("commits").is_empty());
    }

    #[test]
    fn values_are_typed() {
        let (dir, repo) = fixture();
        let invocation = InvocationBuilder::new(ResolveContext::new(Path::new("/base"), &repo))
            .apply_all(vec![
                ArgSpec::text("message", Some("hello".into())),
                ArgSpec::flag("abort", true),
                ArgSpec::directory("git-dir", Some("sub/.git".into())),
            ])
            .unwrap()
            .build();

        assert_eq!(invocation.text("message"), Some("hello"));
        assert!(invocation.flag("abort"));
        assert_eq!(
            invocation.directory("git-dir"),
            Some(Path::new("/base/sub/.git"))
        );
        drop(dir);
    }

    #[test]
    fn first_failure_stops_application() {
        let (dir, repo) = fixture();
        let err = InvocationBuilder::new(ResolveContext::new(dir.path(), &repo))
            .apply_all(vec![
                ArgSpec::text("message", None).required(),
                ArgSpec::revision("commit", Some("HEAD".into())),
            ])
            .unwrap_err();
        assert!(matches!(err, ArgError::Required(_)));
        assert!(!repo.is_open());
    }
}
