//! Snapshot builders: walk the inputs, fan digests out over a bounded pool.
//!
//! # Overview
//!
//! The public walk enumerates every file under the public root (walkdir,
//! symlinks never followed), filters it through the gitignore-style matcher
//! and the prune list, then computes [`file_digest`] for each survivor on a
//! dedicated rayon pool sized by `io_threads`. The entries walk lists only
//! the immediate subdirectories of the entries root and computes
//! [`dir_digest`] for each.
//!
//! Both builders are all-or-nothing: the first digest failure aborts the
//! whole build and completed sibling results are discarded.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::digest::{dir_digest, file_digest};

use super::{Snapshot, SnapshotConfig, SnapshotError};

/// Build the public-category snapshot: one fingerprint per file under `root`.
///
/// Paths matching `config.exclude` (relative to `root`, gitignore semantics)
/// and anything under a `config.prune` path are left out. Returns an error if
/// `root` is not a directory or any surviving file cannot be digested.
pub fn build_public_snapshot(
    root: &Path,
    config: &SnapshotConfig,
) -> Result<Snapshot, SnapshotError> {
    if !root.is_dir() {
        return Err(SnapshotError::NotADirectory(root.to_path_buf()));
    }

    let matcher = build_matcher(root, &config.exclude);
    let mut files: Vec<PathBuf> = Vec::new();

    let walk = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            // Always descend into the root itself.
            if entry.depth() == 0 {
                return true;
            }
            keep_entry(
                entry.path(),
                entry.file_type().is_dir(),
                entry.file_type().is_symlink(),
                root,
                config,
                matcher.as_ref(),
            )
        });

    for entry in walk {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            SnapshotError::Io {
                path,
                source: e.into(),
            }
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    log::debug!(
        "Public snapshot: digesting {} files under {}",
        files.len(),
        root.display()
    );
    digest_parallel(files, config.io_threads, file_digest)
}

/// Build the entries-category snapshot: one subtree fingerprint per immediate
/// subdirectory of `entries_root`.
///
/// A missing entries root or one with no subdirectories yields an empty
/// snapshot, not an error — a project with no configured entries simply has
/// nothing in this category.
pub fn build_entries_snapshot(
    entries_root: &Path,
    config: &SnapshotConfig,
) -> Result<Snapshot, SnapshotError> {
    if !entries_root.is_dir() {
        log::debug!(
            "Entries root {} does not exist, snapshot is empty",
            entries_root.display()
        );
        return Ok(Snapshot::new());
    }

    let mut dirs: Vec<PathBuf> = Vec::new();
    let read_dir = std::fs::read_dir(entries_root).map_err(|e| SnapshotError::Io {
        path: entries_root.to_path_buf(),
        source: e,
    })?;
    for child in read_dir {
        let child = child.map_err(|e| SnapshotError::Io {
            path: entries_root.to_path_buf(),
            source: e,
        })?;
        let file_type = child.file_type().map_err(|e| SnapshotError::Io {
            path: child.path(),
            source: e,
        })?;
        // Only real immediate subdirectories count as entries.
        if !file_type.is_dir() || file_type.is_symlink() {
            continue;
        }
        if config.skip_hidden && is_hidden(&child.file_name()) {
            log::trace!("Skipping hidden entry: {}", child.path().display());
            continue;
        }
        dirs.push(child.path());
    }
    dirs.sort();

    log::debug!(
        "Entries snapshot: digesting {} entry directories under {}",
        dirs.len(),
        entries_root.display()
    );
    digest_parallel(dirs, config.io_threads, dir_digest)
}

/// Digest a batch of paths on a dedicated bounded pool.
///
/// The pool caps concurrent file handles; collection is fail-fast, so the
/// first error cancels outstanding work and discards completed siblings.
fn digest_parallel<F>(
    paths: Vec<PathBuf>,
    io_threads: usize,
    digest: F,
) -> Result<Snapshot, SnapshotError>
where
    F: Fn(&Path) -> Result<String, crate::digest::DigestError> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(io_threads.max(1))
        .build()?;

    let snapshot = pool.install(|| {
        paths
            .into_par_iter()
            .map(|path| digest(&path).map(|d| (path, d)))
            .collect::<Result<Snapshot, _>>()
    })?;
    Ok(snapshot)
}

/// Decide whether the public walk keeps a non-root entry.
fn keep_entry(
    path: &Path,
    is_dir: bool,
    is_symlink: bool,
    root: &Path,
    config: &SnapshotConfig,
    matcher: Option<&Gitignore>,
) -> bool {
    if is_symlink {
        log::trace!("Skipping symlink: {}", path.display());
        return false;
    }

    // Pruned subtrees (entries root, cache file) never enter the public set.
    if config.prune.iter().any(|p| path.starts_with(p)) {
        return false;
    }

    if config.skip_hidden {
        if let Some(name) = path.file_name() {
            if is_hidden(name) {
                return false;
            }
        }
    }

    if let Some(matcher) = matcher {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if matcher.matched(relative, is_dir).is_ignore() {
            log::trace!("Excluded by pattern: {}", path.display());
            return false;
        }
    }

    true
}

/// Build a gitignore-style matcher from the configured patterns.
///
/// Invalid patterns are logged and dropped rather than failing the walk.
fn build_matcher(root: &Path, patterns: &[String]) -> Option<Gitignore> {
    if patterns.is_empty() {
        return None;
    }

    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        if let Err(e) = builder.add_line(None, pattern) {
            log::warn!("Invalid exclude pattern '{}': {}", pattern, e);
        }
    }

    match builder.build() {
        Ok(matcher) if !matcher.is_empty() => Some(matcher),
        Ok(_) => None,
        Err(e) => {
            log::warn!("Failed to build exclude patterns: {}", e);
            None
        }
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
