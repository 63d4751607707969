//! Build-lifecycle session: compute, query, plan, commit.
//!
//! # Overview
//!
//! [`BuildSession`] threads the state of one incremental build run through
//! the three host call points as an explicit object rather than closure
//! captures: `compute` builds both snapshots and diffs them against the
//! prior record, `is_changed`/`diff` answer queries, and `commit` persists
//! the current snapshots. The host calls `commit` only after its build has
//! completed successfully — on failure the prior cache stays authoritative
//! and the next run recomputes the same diff.
//!
//! # Example
//!
//! ```no_run
//! use entrycache::config::Options;
//! use entrycache::input::BuildInput;
//! use entrycache::session::{BuildPlan, BuildSession};
//!
//! let options = Options::new("/project", "pages");
//! let mut session = BuildSession::new(options)?;
//! let diff = session.compute()?;
//!
//! let input = BuildInput::from_json(r#"{"x": "pages/x/main.ts"}"#)?;
//! match session.plan(&input)? {
//!     BuildPlan::Full => { /* rebuild everything */ }
//!     BuildPlan::Unchanged => { /* nothing to do */ }
//!     BuildPlan::Partial(restricted) => { /* rebuild the restricted set */ }
//! }
//! // ... run the build ...
//! session.commit()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cache::{CacheError, CacheRecord};
use crate::config::{ConfigError, Options};
use crate::diff::{diff_all, DiffResult};
use crate::fsutil;
use crate::input::BuildInput;
use crate::snapshot::{
    build_entries_snapshot, build_public_snapshot, Category, SnapshotConfig, SnapshotError,
};

/// What the external build should do, derived from the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPlan {
    /// A public asset changed: rebuild with the original, unrestricted input
    /// set. Public edits are global and cannot be scoped to entries.
    Full,
    /// Nothing changed in either category. The host decides whether to force
    /// a build anyway; the session never aborts the process.
    Unchanged,
    /// Rebuild only the contained input set.
    Partial(BuildInput),
}

/// Errors from session lifecycle calls.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// A lifecycle call needed snapshots that have not been computed yet.
    #[error("Session diff has not been computed yet; call compute first")]
    NotComputed,

    /// A snapshot build failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Persisting the cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// State of one incremental build run.
pub struct BuildSession {
    options: Options,
    prior: CacheRecord,
    current: Option<CacheRecord>,
    diff: Option<DiffResult>,
    out_dir: Option<PathBuf>,
    empty_out_dir: bool,
}

impl BuildSession {
    /// Validate `options` and load the prior cache record.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        options.validate()?;
        let prior = CacheRecord::load(&options.cache_path);
        log::debug!(
            "Prior cache: {} public files, {} entries",
            prior.public.len(),
            prior.entries.len()
        );
        Ok(Self {
            options,
            prior,
            current: None,
            diff: None,
            out_dir: None,
            empty_out_dir: false,
        })
    }

    /// Build both current snapshots and diff them against the prior record.
    ///
    /// Both snapshots are fully materialized before diffing; a failure in
    /// either aborts the run with no diff available.
    pub fn compute(&mut self) -> Result<DiffResult, SessionError> {
        let started = Instant::now();

        let snapshot_config = SnapshotConfig::default()
            .with_exclude(self.options.merged_exclude())
            .with_skip_hidden(self.options.skip_hidden)
            .with_io_threads(self.options.io_threads)
            .with_prune(vec![
                self.options.entries_root.clone(),
                self.options.cache_path.clone(),
            ]);

        let public = build_public_snapshot(&self.options.root, &snapshot_config)?;
        let entries = build_entries_snapshot(&self.options.entries_root, &snapshot_config)?;
        let current = CacheRecord::new(public, entries);

        let diff = diff_all(&self.prior, &current);
        log::debug!(
            "Diff computed in {:?}: public {} changes, entries {} changes",
            started.elapsed(),
            diff.public.len(),
            diff.entries.len()
        );

        self.current = Some(current);
        self.diff = Some(diff.clone());
        Ok(diff)
    }

    /// The computed diff, if `compute` has run.
    #[must_use]
    pub fn diff(&self) -> Option<&DiffResult> {
        self.diff.as_ref()
    }

    /// Whether the given category changed. False before `compute`.
    #[must_use]
    pub fn is_changed(&self, category: Category) -> bool {
        self.diff
            .as_ref()
            .is_some_and(|d| d.category(category).changed)
    }

    /// Record the host-resolved output directory and its empty-output flag.
    ///
    /// Emptying the output directory on every build defeats incremental
    /// rebuilds, so an enabled flag is warned about.
    pub fn set_output(&mut self, out_dir: impl Into<PathBuf>, empty_out_dir: bool) {
        self.out_dir = Some(out_dir.into());
        self.empty_out_dir = empty_out_dir;
        if empty_out_dir {
            log::warn!(
                "The build tool is configured to empty its output directory; \
                 stale outputs from skipped entries will be lost"
            );
        }
    }

    /// Derive the build plan for the declared `input` set.
    ///
    /// Relative declared paths are resolved against the public root before
    /// being matched against the affected entry directories; the returned
    /// input keeps the original declared paths.
    pub fn plan(&self, input: &BuildInput) -> Result<BuildPlan, SessionError> {
        let diff = self.diff.as_ref().ok_or(SessionError::NotComputed)?;

        if diff.public.changed {
            log::info!("Public files changed, requesting a full rebuild");
            return Ok(BuildPlan::Full);
        }
        if !diff.entries.changed {
            log::info!("No file changes detected");
            return Ok(BuildPlan::Unchanged);
        }

        let affected: Vec<&PathBuf> = diff.entries.affected().collect();
        let root = &self.options.root;
        let restricted = input.restrict(|path| {
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                root.join(path)
            };
            affected.iter().any(|dir| absolute.starts_with(dir))
        });

        if restricted.is_empty() && !diff.entries.deleted.is_empty() {
            if let Some(first) = input.first_declared() {
                log::warn!(
                    "Entries were deleted but none edited; selecting the first \
                     declared input so the build has something to process"
                );
                return Ok(BuildPlan::Partial(first));
            }
        }

        Ok(BuildPlan::Partial(restricted))
    }

    /// Persist the current snapshots, replacing the prior cache record.
    ///
    /// Must only be called after the consuming build succeeded. When
    /// `remove_deleted` is configured and an output directory is known, the
    /// stale outputs of deleted entries are removed best-effort first.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        let current = self.current.as_ref().ok_or(SessionError::NotComputed)?;

        if self.options.remove_deleted {
            self.remove_deleted_outputs();
        }

        current.save(&self.options.cache_path)?;
        self.prior = current.clone();
        Ok(())
    }

    /// Delete output directories corresponding to deleted entries.
    ///
    /// Failures are logged, not fatal: a leftover output directory is
    /// harmless, a failed commit is not.
    fn remove_deleted_outputs(&self) {
        let (Some(diff), Some(out_dir)) = (&self.diff, &self.out_dir) else {
            return;
        };

        let stale: Vec<PathBuf> = diff
            .entries
            .deleted
            .iter()
            .filter_map(|entry| entry.strip_prefix(&self.options.entries_root).ok())
            .map(|relative| out_dir.join(relative))
            .collect();
        if stale.is_empty() {
            return;
        }

        log::info!("Removing {} stale output directories", stale.len());
        if let Err(e) = fsutil::remove_paths(&stale) {
            log::warn!("Failed to remove stale outputs: {}", e);
        }
    }

    /// The validated options this session runs with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The host-resolved output directory, if recorded.
    #[must_use]
    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }
}
