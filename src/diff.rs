//! The fingerprint diff engine.
//!
//! # Overview
//!
//! Compares a prior snapshot against a current snapshot for each category and
//! classifies every path into added / edited / deleted, with a derived
//! `changed` flag. The comparison is pure in-memory work: deterministic,
//! no I/O, no suspension. Set membership is the contract — callers needing
//! order must sort explicitly (the sets iterate sorted as a side effect of
//! their representation, but nothing downstream relies on it).

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::cache::CacheRecord;
use crate::snapshot::{Category, Snapshot};

/// Classification of one category's paths between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryDiff {
    /// Present now, absent before.
    pub added: BTreeSet<PathBuf>,
    /// Present in both with differing fingerprints.
    pub edited: BTreeSet<PathBuf>,
    /// Present before, absent now.
    pub deleted: BTreeSet<PathBuf>,
    /// True iff any of the three sets is non-empty.
    pub changed: bool,
}

impl CategoryDiff {
    /// Paths that exist now and differ from the prior run (added ∪ edited).
    pub fn affected(&self) -> impl Iterator<Item = &PathBuf> {
        self.added.iter().chain(self.edited.iter())
    }

    /// Total number of classified paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.edited.len() + self.deleted.len()
    }

    /// True when nothing changed in this category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Diff results for both categories of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// Public-file classification.
    #[serde(rename = "pub")]
    pub public: CategoryDiff,
    /// Entry-directory classification.
    pub entries: CategoryDiff,
}

impl DiffResult {
    /// Diff for one category.
    #[must_use]
    pub fn category(&self, category: Category) -> &CategoryDiff {
        match category {
            Category::Public => &self.public,
            Category::Entries => &self.entries,
        }
    }

    /// True when either category changed.
    #[must_use]
    pub fn any_changed(&self) -> bool {
        self.public.changed || self.entries.changed
    }
}

/// Classify every path of one category.
///
/// Keys only in `prior` are deleted; keys in both with differing fingerprints
/// are edited; keys only in `current` are added. Equal fingerprints are
/// omitted from all three sets.
#[must_use]
pub fn diff_category(prior: &Snapshot, current: &Snapshot) -> CategoryDiff {
    let mut diff = CategoryDiff::default();

    for (path, fingerprint) in prior {
        match current.get(path) {
            None => {
                diff.deleted.insert(path.clone());
            }
            Some(now) if now != fingerprint => {
                diff.edited.insert(path.clone());
            }
            Some(_) => {}
        }
    }
    for path in current.keys() {
        if !prior.contains_key(path) {
            diff.added.insert(path.clone());
        }
    }

    diff.changed = !diff.is_empty();
    diff
}

/// Diff both categories independently; public files and entry directories
/// are never cross-compared.
#[must_use]
pub fn diff_all(prior: &CacheRecord, current: &CacheRecord) -> DiffResult {
    DiffResult {
        public: diff_category(&prior.public, &current.public),
        entries: diff_category(&prior.entries, &current.entries),
    }
}
