//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (SHA)
//! - [`RefName`] - Validated fully-qualified Git reference name
//! - [`BranchName`] - Validated short branch name
//! - [`UtcTimestamp`] - RFC3339 timestamp
//!
//! These types enforce validity at construction time.
//!
//! # Examples
//!
//! ```
//! use logical_git::core::types::{BranchName, Oid, RefName};
//!
//! let branch = BranchName::new("feature/model-split").unwrap();
//! let refname = RefName::for_branch(&branch);
//! assert_eq!(refname.as_str(), "refs/heads/feature/model-split");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),
}

/// Check the rules of `git check-ref-format` shared by refs and branches.
///
/// Returns a description of the first violated rule.
fn refname_violation(name: &str) -> Option<&'static str> {
    const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

    if name.is_empty() {
        return Some("name cannot be empty");
    }
    if name == "@" {
        return Some("name cannot be '@'");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Some("name cannot start or end with '/'");
    }
    if name.ends_with('.') {
        return Some("name cannot end with '.'");
    }
    if name.contains("..") || name.contains("@{") || name.contains("//") {
        return Some("name cannot contain '..', '@{' or '//'");
    }
    if name.chars().any(|c| INVALID_CHARS.contains(&c) || c.is_ascii_control()) {
        return Some("name contains a forbidden character");
    }
    if name
        .split('/')
        .any(|component| component.starts_with('.') || component.ends_with(".lock"))
    {
        return Some("path component cannot start with '.' or end with '.lock'");
    }
    None
}

/// A validated short branch name (`main`, `feature/x`).
///
/// # Example
///
/// ```
/// use logical_git::core::types::BranchName;
///
/// assert!(BranchName::new("feature/my-branch").is_ok());
/// assert!(BranchName::new("-flag").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.starts_with('-') {
            return Err(TypeError::InvalidBranchName(
                "branch name cannot start with '-'".into(),
            ));
        }
        if let Some(problem) = refname_violation(&name) {
            return Err(TypeError::InvalidBranchName(problem.into()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A Git object identifier, normalized to lowercase hex.
///
/// # Example
///
/// ```
/// use logical_git::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not a full hex OID.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        // SHA-1 is 40 hex chars, SHA-256 is 64
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// The first `len` characters, or the whole id if shorter.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl AsRef<str> for Oid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated, fully-qualified Git reference name (`refs/heads/main`, `HEAD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RefName(String);

impl RefName {
    /// Create a new validated ref name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRefName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if let Some(problem) = refname_violation(&name) {
            return Err(TypeError::InvalidRefName(problem.into()));
        }
        Ok(Self(name))
    }

    /// `refs/heads/<branch>`.
    pub fn for_branch(branch: &BranchName) -> Self {
        Self(format!("refs/heads/{}", branch.as_str()))
    }

    /// The branch this ref names, if it is under `refs/heads/`.
    ///
    /// # Example
    ///
    /// ```
    /// use logical_git::core::types::RefName;
    ///
    /// let refname = RefName::new("refs/heads/feature/foo").unwrap();
    /// assert_eq!(refname.branch().unwrap().as_str(), "feature/foo");
    /// assert!(RefName::new("refs/tags/v1").unwrap().branch().is_none());
    /// ```
    pub fn branch(&self) -> Option<BranchName> {
        self.0
            .strip_prefix("refs/heads/")
            .and_then(|name| BranchName::new(name).ok())
    }

    /// Name for display: the branch or tag name when there is one.
    pub fn shorthand(&self) -> &str {
        self.0
            .strip_prefix("refs/heads/")
            .or_else(|| self.0.strip_prefix("refs/tags/"))
            .or_else(|| self.0.strip_prefix("refs/remotes/"))
            .unwrap_or(&self.0)
    }

    pub fn is_branch_ref(&self) -> bool {
        self.0.starts_with("refs/heads/")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RefName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RefName> for String {
    fn from(name: RefName) -> Self {
        name.0
    }
}

impl AsRef<str> for RefName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UTC timestamp in RFC3339 format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod branch_name {
        use super::*;

        #[test]
        fn valid_branch_names() {
            assert!(BranchName::new("main").is_ok());
            assert!(BranchName::new("feature/foo").is_ok());
            assert!(BranchName::new("user@feature").is_ok());
            assert!(BranchName::new("with.dot").is_ok());
        }

        #[test]
        fn invalid_branch_names() {
            assert!(BranchName::new("").is_err());
            assert!(BranchName::new("@").is_err());
            assert!(BranchName::new(".hidden").is_err());
            assert!(BranchName::new("foo/.hidden").is_err());
            assert!(BranchName::new("-flag").is_err());
            assert!(BranchName::new("branch.lock").is_err());
            assert!(BranchName::new("branch/").is_err());
            assert!(BranchName::new("bad..path").is_err());
            assert!(BranchName::new("foo@{bar").is_err());
            assert!(BranchName::new("foo//bar").is_err());
            assert!(BranchName::new("has space").is_err());
            assert!(BranchName::new("has~tilde").is_err());
            assert!(BranchName::new("has\ttab").is_err());
        }

        #[test]
        fn serde_roundtrip() {
            let name = BranchName::new("feature/test").unwrap();
            let json = serde_json::to_string(&name).unwrap();
            let parsed: BranchName = serde_json::from_str(&json).unwrap();
            assert_eq!(name, parsed);
        }
    }

    mod oid {
        use super::*;

        #[test]
        fn valid_lengths() {
            assert!(Oid::new("abc123def4567890abc123def4567890abc12345").is_ok());
            let sha256 = "abc123def4567890abc123def4567890abc123def4567890abc123def456789a";
            assert!(Oid::new(sha256).is_ok());
        }

        #[test]
        fn normalizes_to_lowercase() {
            let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
            assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
        }

        #[test]
        fn abbreviated_ids_rejected() {
            assert!(Oid::new("abc123d").is_err());
            assert!(Oid::new("").is_err());
        }

        #[test]
        fn non_hex_rejected() {
            assert!(Oid::new("xyz123def4567890abc123def4567890abc12345").is_err());
        }

        #[test]
        fn short_form() {
            let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
            assert_eq!(oid.short(7), "abc123d");
            assert_eq!(oid.short(100), oid.as_str());
        }
    }

    mod ref_name {
        use super::*;

        #[test]
        fn valid_refs() {
            assert!(RefName::new("refs/heads/main").is_ok());
            assert!(RefName::new("refs/tags/v1.0").is_ok());
            assert!(RefName::new("HEAD").is_ok());
        }

        #[test]
        fn invalid_refs() {
            assert!(RefName::new("").is_err());
            assert!(RefName::new("/refs/heads/main").is_err());
            assert!(RefName::new("refs/heads/main.lock").is_err());
            assert!(RefName::new("refs//heads/main").is_err());
        }

        #[test]
        fn for_branch_roundtrips_through_branch() {
            let branch = BranchName::new("feature/foo").unwrap();
            let refname = RefName::for_branch(&branch);
            assert!(refname.is_branch_ref());
            assert_eq!(refname.branch(), Some(branch));
        }

        #[test]
        fn shorthand() {
            assert_eq!(RefName::new("refs/heads/main").unwrap().shorthand(), "main");
            assert_eq!(RefName::new("refs/tags/v2").unwrap().shorthand(), "v2");
            assert_eq!(RefName::new("HEAD").unwrap().shorthand(), "HEAD");
        }
    }
}
