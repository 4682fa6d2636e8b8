//! compare::invoke
//!
//! Preparing snapshots, running the engine, and applying its verdicts.
//!
//! [`Comparator`] is what commands talk to. It pairs an engine with the model
//! scope, builds one isolated snapshot per side, and turns engine results
//! into either resolved repository content or a list of unresolved paths.
//! Engine and repository failures surface as software-error death signals.

use crate::core::config::Config;
use crate::core::pathfilter::PathFilter;
use crate::core::resolve::ResolvedRef;
use crate::core::signal::Die;
use crate::git::{ConflictEntry, Git, TreeMerge};

use super::builtin::FileEngine;
use super::engine::{Comparison, ComparisonEngine, MergeVerdict, Settled};
use super::external::ExternalEngine;
use super::snapshot::{ModelScope, Snapshot};

/// How a set of conflicts came out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Paths the engine resolved.
    pub resolved: Vec<String>,
    /// Paths still conflicted, sorted.
    pub unresolved: Vec<String>,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// A resolution the engine produced for one conflicted path.
type Resolution = (String, Option<Vec<u8>>);

/// Engine plus model scope.
pub struct Comparator {
    engine: Box<dyn ComparisonEngine>,
    scope: ModelScope,
}

impl std::fmt::Debug for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("engine", &self.engine.name())
            .field("scope", &self.scope)
            .finish()
    }
}

impl Comparator {
    pub fn new(engine: Box<dyn ComparisonEngine>, scope: ModelScope) -> Self {
        Self { engine, scope }
    }

    /// The configured external engine, or the built-in one.
    pub fn from_config(config: &Config) -> Self {
        let engine: Box<dyn ComparisonEngine> = match config.engine() {
            Some(engine) => Box::new(ExternalEngine::from_config(engine)),
            None => Box::new(FileEngine),
        };
        Self::new(engine, ModelScope::from_config(config))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn scope(&self) -> &ModelScope {
        &self.scope
    }

    /// Model content of one side.
    pub fn snapshot(
        &self,
        git: &Git,
        side: &ResolvedRef,
        filter: &PathFilter,
    ) -> Result<Snapshot, Die> {
        Ok(Snapshot::of(git, side, &self.scope, filter)?)
    }

    /// Model differences from `left` to `right`.
    pub fn compare(
        &self,
        git: &Git,
        left: &ResolvedRef,
        right: &ResolvedRef,
        filter: &PathFilter,
    ) -> Result<Comparison, Die> {
        let left = self.snapshot(git, left, filter)?;
        let right = self.snapshot(git, right, filter)?;
        Ok(self.engine.compare(&left, &right, filter)?)
    }

    /// Send the conflicts of an in-memory merge through the engine and
    /// apply every resolution to it.
    pub fn resolve_tree_merge(
        &self,
        git: &Git,
        merge: &mut TreeMerge,
        filter: &PathFilter,
    ) -> Result<ConflictReport, Die> {
        if !merge.has_conflicts() {
            return Ok(ConflictReport::default());
        }
        let conflicts = merge.conflicts()?;
        let (resolutions, unresolved) = self.merge_conflicts(git, &conflicts, filter)?;

        let mut resolved = Vec::with_capacity(resolutions.len());
        for (path, content) in resolutions {
            git.resolve_conflict(merge, &path, content.as_deref())?;
            resolved.push(path);
        }
        Ok(ConflictReport {
            resolved,
            unresolved,
        })
    }

    /// Send the conflicted entries of the repository index through the
    /// engine, writing and staging every resolution.
    ///
    /// Conflicts outside `filter` are left alone and not reported.
    pub fn resolve_index(&self, git: &Git, filter: &PathFilter) -> Result<ConflictReport, Die> {
        let conflicts: Vec<ConflictEntry> = git
            .index_conflicts()?
            .into_iter()
            .filter(|c| filter.matches(&c.path))
            .collect();
        let (resolutions, unresolved) = self.merge_conflicts(git, &conflicts, filter)?;

        let mut resolved = Vec::with_capacity(resolutions.len());
        for (path, content) in resolutions {
            git.stage_resolution(&path, content.as_deref())?;
            resolved.push(path);
        }
        Ok(ConflictReport {
            resolved,
            unresolved,
        })
    }

    /// Run one engine merge over every model conflict.
    ///
    /// Non-model conflicts are returned unresolved untouched.
    fn merge_conflicts(
        &self,
        git: &Git,
        conflicts: &[ConflictEntry],
        filter: &PathFilter,
    ) -> Result<(Vec<Resolution>, Vec<String>), Die> {
        let (models, others): (Vec<&ConflictEntry>, Vec<&ConflictEntry>) = conflicts
            .iter()
            .partition(|c| self.scope.selects(filter, &c.path));

        let mut unresolved: Vec<String> = others.iter().map(|c| c.path.clone()).collect();
        let mut resolutions = Vec::new();

        if !models.is_empty() {
            let mut base = Snapshot::empty("base");
            let mut ours = Snapshot::empty("ours");
            let mut theirs = Snapshot::empty("theirs");
            for conflict in &models {
                for (stage, snapshot) in [
                    (&conflict.ancestor, &mut base),
                    (&conflict.ours, &mut ours),
                    (&conflict.theirs, &mut theirs),
                ] {
                    if let Some(oid) = stage {
                        snapshot.insert(conflict.path.clone(), git.read_blob(oid)?);
                    }
                }
            }

            let verdict: MergeVerdict = self.engine.merge(&base, &ours, &theirs, filter)?;
            for conflict in models {
                let path = conflict.path.clone();
                match verdict.settle(&path) {
                    Settled::Content(content) => resolutions.push((path, Some(content.to_vec()))),
                    Settled::Deleted => resolutions.push((path, None)),
                    Settled::Unresolved => unresolved.push(path),
                }
            }
        }

        unresolved.sort();
        Ok((resolutions, unresolved))
    }
}
