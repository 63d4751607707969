//! Snapshot construction for the two fingerprint categories.
//!
//! A snapshot maps absolute paths to content fingerprints, captured at one
//! point in time. Two categories exist per run:
//!
//! - [`Category::Public`]: one entry per file under the public root, after
//!   exclusions — any change here is globally build-affecting.
//! - [`Category::Entries`]: one entry per immediate subdirectory of the
//!   entries root, each fingerprint summarizing the whole subtree.
//!
//! See [`builder`] for the walking and bounded-parallel digest fan-out.

pub mod builder;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub use builder::{build_entries_snapshot, build_public_snapshot};

use crate::digest::DigestError;

/// Mapping from absolute path to hex fingerprint for one category.
pub type Snapshot = BTreeMap<PathBuf, String>;

/// The two independently-compared snapshot classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Shared/static assets hashed file-by-file.
    Public,
    /// Build entry directories hashed as single units.
    Entries,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Entries => write!(f, "entries"),
        }
    }
}

/// Configuration for snapshot builds.
///
/// Controls exclusion patterns, hidden-file handling, and the size of the
/// digest worker pool.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Gitignore-style patterns excluded from the public walk.
    pub exclude: Vec<String>,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Number of digest worker threads.
    ///
    /// Bounds concurrent file handles; lower values reduce disk thrashing.
    pub io_threads: usize,

    /// Paths pruned wholesale from the public walk regardless of patterns.
    ///
    /// The entries root and the cache file always land here so they are
    /// never double-hashed into the public category.
    pub prune: Vec<PathBuf>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            skip_hidden: true,
            io_threads: 4,
            prune: Vec::new(),
        }
    }
}

impl SnapshotConfig {
    /// Set the exclusion patterns.
    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set the digest worker thread count (clamped to at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set whether hidden files are skipped.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set the pruned paths.
    #[must_use]
    pub fn with_prune(mut self, prune: Vec<PathBuf>) -> Self {
        self.prune = prune;
        self
    }
}

/// Errors that can occur during a snapshot build.
///
/// Any error aborts the whole build for that category; a partial snapshot
/// would corrupt the diff downstream.
#[derive(thiserror::Error, Debug)]
pub enum SnapshotError {
    /// The public root does not exist or is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A fingerprint computation failed.
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// An I/O error occurred during the walk.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The digest worker pool could not be created.
    #[error("Failed to build digest thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Public.to_string(), "public");
        assert_eq!(Category::Entries.to_string(), "entries");
    }

    #[test]
    fn test_snapshot_config_default() {
        let config = SnapshotConfig::default();
        assert!(config.exclude.is_empty());
        assert!(config.skip_hidden);
        assert_eq!(config.io_threads, 4);
        assert!(config.prune.is_empty());
    }

    #[test]
    fn test_snapshot_config_io_threads_clamped() {
        let config = SnapshotConfig::default().with_io_threads(0);
        assert_eq!(config.io_threads, 1);
    }
}
