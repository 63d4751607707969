//! Run configuration: roots, cache location, exclusion patterns.

use std::fs;
use std::path::{Path, PathBuf};

/// Default cache file location, relative to the public root.
pub const DEFAULT_CACHE_FILE: &str = ".entrycache/snapshots.json";

/// Configuration errors; all fatal and surfaced before any filesystem work.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The public root does not exist or is not a directory.
    #[error("Root path does not exist or is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// No entries root was supplied.
    #[error("An entries root is required")]
    MissingEntriesRoot,

    /// The cache path points at a directory instead of a file.
    #[error("Cache path is a directory, expected a file: {0}")]
    CachePathIsDirectory(PathBuf),
}

/// Validated options for one run.
///
/// Construct with [`Options::new`] and the `with_` builders, then hand to
/// [`crate::session::BuildSession::new`], which validates.
#[derive(Debug, Clone)]
pub struct Options {
    /// Public root: shared/static assets hashed file-by-file.
    pub root: PathBuf,

    /// Entries root: each immediate subdirectory is one build entry point.
    /// Resolved against `root` when given as a relative path.
    pub entries_root: PathBuf,

    /// Location of the persisted snapshot cache.
    pub cache_path: PathBuf,

    /// Caller-supplied exclusion patterns, applied after any `.gitignore`
    /// content.
    pub exclude: Vec<String>,

    /// Skip hidden files in the public walk.
    pub skip_hidden: bool,

    /// Digest worker thread count.
    pub io_threads: usize,

    /// Remove output directories of deleted entries on commit.
    pub remove_deleted: bool,
}

impl Options {
    /// Create options for `root` with the given entries root.
    ///
    /// The cache defaults to [`DEFAULT_CACHE_FILE`] under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, entries_root: impl AsRef<Path>) -> Self {
        let root = root.into();
        let entries_root = root.join(entries_root.as_ref());
        let cache_path = root.join(DEFAULT_CACHE_FILE);
        Self {
            root,
            entries_root,
            cache_path,
            exclude: Vec::new(),
            skip_hidden: true,
            io_threads: 4,
            remove_deleted: false,
        }
    }

    /// Set the cache file location.
    #[must_use]
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }

    /// Set caller-supplied exclusion patterns.
    #[must_use]
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set whether hidden files are skipped in the public walk.
    #[must_use]
    pub fn with_skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Set the digest worker thread count (clamped to at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set whether deleted entries' output directories are removed on commit.
    #[must_use]
    pub fn with_remove_deleted(mut self, remove: bool) -> Self {
        self.remove_deleted = remove;
        self
    }

    /// Validate the configuration before any snapshot work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::RootNotADirectory(self.root.clone()));
        }
        let same_as_root = self
            .entries_root
            .components()
            .eq(self.root.components());
        if same_as_root || self.entries_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingEntriesRoot);
        }
        if self.cache_path.is_dir() {
            return Err(ConfigError::CachePathIsDirectory(self.cache_path.clone()));
        }
        Ok(())
    }

    /// Full exclusion list: the root's `.gitignore` content first, then the
    /// caller-supplied patterns.
    #[must_use]
    pub fn merged_exclude(&self) -> Vec<String> {
        let mut patterns = read_gitignore(&self.root);
        patterns.extend(self.exclude.iter().cloned());
        patterns
    }
}

/// Read exclusion patterns from `root/.gitignore`.
///
/// Lines are trimmed; blank lines and `#` comments are dropped. A missing or
/// unreadable file yields no patterns.
#[must_use]
pub fn read_gitignore(root: &Path) -> Vec<String> {
    let path = root.join(".gitignore");
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            log::debug!("No .gitignore at {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
