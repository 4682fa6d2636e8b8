//! core::resolve
//!
//! Turning command-line tokens into typed values.
//!
//! Every argument a command declares has an [`ArgKind`]. The kind selects a
//! resolver function from an explicit table ([`resolver_for`]); resolvers take
//! the raw tokens plus a [`ResolveContext`] and return an [`ArgValue`] or an
//! [`ArgError`]. Nothing here reads the process working directory: relative
//! paths are resolved against the context's base directory.
//!
//! # Revision resolution order
//!
//! 1. Reference lookup by full or short name (`main`, `refs/tags/v1`)
//! 2. Revision expression (`HEAD~2`, `abc1234`)
//! 3. The object found must peel to a commit
//!
//! A token that resolves to nothing fails with `bad revision '<token>'.`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::pathfilter::{self, OutsideWorkTree, PathFilter};
use crate::core::signal::Die;
use crate::core::types::{Oid, RefName};
use crate::git::{Git, GitError, RepositoryError, RepositoryResolver};

/// Argument validation failures.
#[derive(Debug, Error)]
pub enum ArgError {
    #[error("bad revision '{0}'.")]
    BadRevision(String),

    #[error("'{0}' does not point to a commit.")]
    NotACommit(String),

    #[error("'{0}' is outside the repository.")]
    OutsideRepository(String),

    #[error("Argument \"{0}\" is required")]
    Required(String),

    #[error("Argument \"{name}\" takes a single value")]
    TooManyValues { name: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Git(#[from] GitError),
}

impl ArgError {
    /// Whether the owning command's usage should accompany this error.
    pub fn wants_usage(&self) -> bool {
        !matches!(self, ArgError::Repository(_) | ArgError::Git(_))
    }
}

impl From<OutsideWorkTree> for ArgError {
    fn from(err: OutsideWorkTree) -> Self {
        ArgError::OutsideRepository(err.0)
    }
}

impl From<RepositoryError> for Die {
    fn from(err: RepositoryError) -> Self {
        Die::fatal(err.to_string())
    }
}

impl From<ArgError> for Die {
    fn from(err: ArgError) -> Self {
        match err {
            ArgError::Git(e) => Die::internal(e),
            other => Die::fatal(other.to_string()),
        }
    }
}

/// A validated reference to a commit or to the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRef {
    /// A branch, tag or other ref, with the commit it peels to.
    Ref { name: RefName, commit: Oid },
    /// A commit named by hash or revision expression.
    Commit(Oid),
    /// The current contents of the work tree.
    WorkingTree,
}

impl ResolvedRef {
    /// The commit, or `None` for the working tree.
    pub fn commit(&self) -> Option<&Oid> {
        match self {
            ResolvedRef::Ref { commit, .. } => Some(commit),
            ResolvedRef::Commit(oid) => Some(oid),
            ResolvedRef::WorkingTree => None,
        }
    }

    /// Branch name when this is a local branch ref.
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            ResolvedRef::Ref { name, .. } if name.is_branch_ref() => Some(name.shorthand()),
            _ => None,
        }
    }

    /// Human-readable label: short ref name, short hash, or `working tree`.
    pub fn label(&self) -> String {
        match self {
            ResolvedRef::Ref { name, .. } => name.shorthand().to_string(),
            ResolvedRef::Commit(oid) => oid.short(7).to_string(),
            ResolvedRef::WorkingTree => "working tree".to_string(),
        }
    }
}

impl std::fmt::Display for ResolvedRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Kinds of command arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// One commit-ish token.
    Revision,
    /// One or more commit-ish tokens, order preserved.
    Revisions,
    /// All remaining tokens as one path filter.
    Paths,
    /// A directory, normalized to an absolute path.
    Directory,
    /// Present or absent.
    Flag,
    /// Free text.
    Text,
}

/// A resolved argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Revision(ResolvedRef),
    Revisions(Vec<ResolvedRef>),
    Paths(PathFilter),
    Directory(PathBuf),
    Flag(bool),
    Text(String),
}

/// What resolvers may consult.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub base: &'a Path,
    pub repo: &'a RepositoryResolver,
}

impl<'a> ResolveContext<'a> {
    pub fn new(base: &'a Path, repo: &'a RepositoryResolver) -> Self {
        Self { base, repo }
    }
}

/// Signature shared by every resolver.
pub type Resolver = fn(&str, &[String], &ResolveContext<'_>) -> Result<ArgValue, ArgError>;

/// The resolver for an argument kind.
pub fn resolver_for(kind: ArgKind) -> Resolver {
    match kind {
        ArgKind::Revision => resolve_revision_arg,
        ArgKind::Revisions => resolve_revisions_arg,
        ArgKind::Paths => resolve_paths_arg,
        ArgKind::Directory => resolve_directory_arg,
        ArgKind::Flag => resolve_flag_arg,
        ArgKind::Text => resolve_text_arg,
    }
}

fn single<'t>(name: &str, tokens: &'t [String]) -> Result<&'t str, ArgError> {
    match tokens {
        [token] => Ok(token),
        [] => Err(ArgError::Required(name.to_string())),
        _ => Err(ArgError::TooManyValues {
            name: name.to_string(),
        }),
    }
}

fn resolve_revision_arg(
    name: &str,
    tokens: &[String],
    ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    let token = single(name, tokens)?;
    let git = ctx.repo.resolve()?;
    Ok(ArgValue::Revision(resolve_revision(git, token)?))
}

fn resolve_revisions_arg(
    name: &str,
    tokens: &[String],
    ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    if tokens.is_empty() {
        return Err(ArgError::Required(name.to_string()));
    }
    let git = ctx.repo.resolve()?;
    let resolved = tokens
        .iter()
        .map(|token| resolve_revision(git, token))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ArgValue::Revisions(resolved))
}

fn resolve_paths_arg(
    _name: &str,
    tokens: &[String],
    ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    if tokens.is_empty() {
        return Ok(ArgValue::Paths(PathFilter::all()));
    }
    let git = ctx.repo.resolve()?;
    let filter = PathFilter::from_tokens(ctx.base, git.work_dir()?, tokens)?;
    Ok(ArgValue::Paths(filter))
}

fn resolve_directory_arg(
    name: &str,
    tokens: &[String],
    ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    let token = single(name, tokens)?;
    Ok(ArgValue::Directory(pathfilter::normalize(ctx.base, token)))
}

fn resolve_flag_arg(
    _name: &str,
    tokens: &[String],
    _ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    Ok(ArgValue::Flag(!tokens.is_empty()))
}

fn resolve_text_arg(
    name: &str,
    tokens: &[String],
    _ctx: &ResolveContext<'_>,
) -> Result<ArgValue, ArgError> {
    Ok(ArgValue::Text(single(name, tokens)?.to_string()))
}

/// Resolve one commit-ish token.
///
/// # Errors
///
/// - [`ArgError::NotACommit`] if the token names a tree, blob, or a tag of one
/// - [`ArgError::BadRevision`] if the token names nothing
pub fn resolve_revision(git: &Git, token: &str) -> Result<ResolvedRef, ArgError> {
    if let Some(entry) = git.find_ref(token)? {
        let commit = git
            .peel_to_commit(&entry.target.oid)?
            .ok_or_else(|| ArgError::NotACommit(token.to_string()))?;
        return Ok(ResolvedRef::Ref {
            name: entry.name,
            commit,
        });
    }

    match git.revparse(token)? {
        Some(object) => {
            let commit = git
                .peel_to_commit(&object.oid)?
                .ok_or_else(|| ArgError::NotACommit(token.to_string()))?;
            Ok(ResolvedRef::Commit(commit))
        }
        None => Err(ArgError::BadRevision(token.to_string())),
    }
}
