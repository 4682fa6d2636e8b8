//! compare::builtin
//!
//! File-granularity engine used when no external engine is configured.
//!
//! Two files are equal when their bytes are equal. A three-way merge takes a
//! side when only that side changed, takes identical changes once, and
//! reports a conflict otherwise.

use std::collections::BTreeSet;

use super::engine::{Change, ChangeKind, Comparison, ComparisonEngine, EngineError, MergeVerdict};
use super::snapshot::Snapshot;
use crate::core::pathfilter::PathFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct FileEngine;

fn union<'a>(snapshots: &[&'a Snapshot], filter: &PathFilter) -> BTreeSet<&'a str> {
    snapshots
        .iter()
        .flat_map(|s| s.paths())
        .filter(|p| filter.matches(p))
        .collect()
}

impl ComparisonEngine for FileEngine {
    fn name(&self) -> &str {
        "builtin"
    }

    fn compare(
        &self,
        left: &Snapshot,
        right: &Snapshot,
        filter: &PathFilter,
    ) -> Result<Comparison, EngineError> {
        let changes = union(&[left, right], filter)
            .into_iter()
            .filter_map(|path| {
                let kind = match (left.get(path), right.get(path)) {
                    (None, Some(_)) => ChangeKind::Added,
                    (Some(_), None) => ChangeKind::Deleted,
                    (Some(a), Some(b)) if a != b => ChangeKind::Modified,
                    _ => return None,
                };
                Some(Change {
                    path: path.to_string(),
                    kind,
                })
            })
            .collect();
        Ok(Comparison::new(changes))
    }

    fn merge(
        &self,
        base: &Snapshot,
        ours: &Snapshot,
        theirs: &Snapshot,
        filter: &PathFilter,
    ) -> Result<MergeVerdict, EngineError> {
        let mut merged = Snapshot::empty("merged");
        let mut deleted = Vec::new();
        let mut conflicts = Vec::new();

        for path in union(&[base, ours, theirs], filter) {
            let (b, o, t) = (base.get(path), ours.get(path), theirs.get(path));
            let taken = if o == t || b == t {
                o
            } else if b == o {
                t
            } else {
                conflicts.push(path.to_string());
                continue;
            };
            match taken {
                Some(content) => merged.insert(path, content.to_vec()),
                None => deleted.push(path.to_string()),
            }
        }

        Ok(MergeVerdict {
            merged,
            deleted,
            conflicted: !conflicts.is_empty(),
            conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::engine::Settled;

    fn snap(files: &[(&str, &str)]) -> Snapshot {
        let mut snapshot = Snapshot::empty("test");
        for (path, content) in files {
            snapshot.insert(*path, content.as_bytes().to_vec());
        }
        snapshot
    }

    mod compare {
        use super::*;

        #[test]
        fn classifies_changes() {
            let left = snap(&[("same.uml", "x"), ("gone.uml", "x"), ("edit.uml", "1")]);
            let right = snap(&[("same.uml", "x"), ("new.uml", "x"), ("edit.uml", "2")]);

            let result = FileEngine.compare(&left, &right, &PathFilter::all()).unwrap();
            let lines: Vec<String> = result.changes.iter().map(|c| c.to_string()).collect();
            assert_eq!(lines, vec!["M\tedit.uml", "D\tgone.uml", "A\tnew.uml"]);
        }

        #[test]
        fn identical_sides_have_no_changes() {
            let side = snap(&[("a.uml", "x")]);
            assert!(FileEngine
                .compare(&side, &side.clone(), &PathFilter::all())
                .unwrap()
                .is_empty());
        }
    }

    mod merge {
        use super::*;

        #[test]
        fn one_sided_changes_merge() {
            let base = snap(&[("a.uml", "0"), ("b.uml", "0"), ("c.uml", "0")]);
            let ours = snap(&[("a.uml", "1"), ("b.uml", "0")]);
            let theirs = snap(&[("a.uml", "0"), ("b.uml", "2"), ("c.uml", "0"), ("d.uml", "n")]);

            let verdict = FileEngine
                .merge(&base, &ours, &theirs, &PathFilter::all())
                .unwrap();
            assert!(verdict.is_clean());
            assert_eq!(verdict.merged.get("a.uml"), Some(&b"1"[..]));
            assert_eq!(verdict.merged.get("b.uml"), Some(&b"2"[..]));
            assert!(!verdict.merged.contains("c.uml"));
            assert_eq!(verdict.settle("c.uml"), Settled::Deleted);
            assert_eq!(verdict.merged.get("d.uml"), Some(&b"n"[..]));
        }

        #[test]
        fn identical_changes_merge() {
            let base = snap(&[("a.uml", "0")]);
            let both = snap(&[("a.uml", "1")]);
            let verdict = FileEngine
                .merge(&base, &both, &both.clone(), &PathFilter::all())
                .unwrap();
            assert!(verdict.is_clean());
            assert_eq!(verdict.merged.get("a.uml"), Some(&b"1"[..]));
        }

        #[test]
        fn divergent_changes_conflict() {
            let base = snap(&[("a.uml", "0"), ("b.uml", "0")]);
            let ours = snap(&[("a.uml", "1"), ("b.uml", "0")]);
            let theirs = snap(&[("a.uml", "2")]);

            let verdict = FileEngine
                .merge(&base, &ours, &theirs, &PathFilter::all())
                .unwrap();
            assert_eq!(verdict.conflicts, vec!["a.uml".to_string()]);
            assert!(!verdict.merged.contains("a.uml"));
            // b.uml deleted by theirs only.
            assert!(!verdict.merged.contains("b.uml"));
            assert!(!verdict.is_conflicted("b.uml"));
        }

        #[test]
        fn modify_delete_conflicts() {
            let base = snap(&[("a.uml", "0")]);
            let ours = snap(&[("a.uml", "1")]);
            let theirs = snap(&[]);
            let verdict = FileEngine
                .merge(&base, &ours, &theirs, &PathFilter::all())
                .unwrap();
            assert!(verdict.is_conflicted("a.uml"));
            assert!(!verdict.is_clean());
        }
    }
}
