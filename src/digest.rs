//! Content fingerprints for files and directory subtrees.
//!
//! # Overview
//!
//! A fingerprint is a hex-encoded BLAKE3 digest. For a file it covers the raw
//! bytes, read in a streaming fashion so large assets never have to fit in
//! memory. For a directory it covers the subtree: children are visited in
//! sorted name order and `(name, child digest)` pairs are folded into the
//! hasher, so a renamed-but-identical file still changes the parent digest.
//!
//! Symbolic links are skipped entirely rather than followed; this keeps the
//! digest a pure function of the tree content and sidesteps link cycles.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Maximum directory nesting accepted before the digest is aborted.
///
/// Deep enough for any real project layout while keeping the recursion
/// bounded on pathological trees.
pub const MAX_DEPTH: usize = 128;

/// Read buffer size for streaming file digests.
const READ_BUF_SIZE: usize = 64 * 1024;

/// Errors that can occur while computing a fingerprint.
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    /// An I/O error occurred while reading a file or listing a directory.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Directory nesting exceeded [`MAX_DEPTH`] levels.
    #[error("Directory nesting deeper than {MAX_DEPTH} levels at {0}")]
    TooDeep(PathBuf),
}

impl DigestError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Compute the fingerprint of a single file's byte content.
///
/// The file is read through a fixed-size buffer; an unreadable file yields
/// [`DigestError::Io`] and the caller decides whether that means "deleted"
/// or aborts the operation.
pub fn file_digest(path: &Path) -> Result<String, DigestError> {
    let mut file = File::open(path).map_err(|e| DigestError::io(path, e))?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = vec![0u8; READ_BUF_SIZE];
    loop {
        let n = file.read(&mut buf).map_err(|e| DigestError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute the fingerprint of a directory subtree.
///
/// Children are folded in sorted name order. For each child the name is
/// hashed first, then the child's own digest (recursive for directories,
/// [`file_digest`] for files). An empty directory yields the stable digest
/// of the empty fold, not an error.
pub fn dir_digest(path: &Path) -> Result<String, DigestError> {
    dir_digest_at(path, 0)
}

fn dir_digest_at(path: &Path, depth: usize) -> Result<String, DigestError> {
    if depth > MAX_DEPTH {
        return Err(DigestError::TooDeep(path.to_path_buf()));
    }

    let mut children: Vec<std::fs::DirEntry> = std::fs::read_dir(path)
        .map_err(|e| DigestError::io(path, e))?
        .collect::<Result<_, _>>()
        .map_err(|e| DigestError::io(path, e))?;
    children.sort_by_key(std::fs::DirEntry::file_name);

    let mut hasher = blake3::Hasher::new();
    for child in children {
        let child_path = child.path();
        let file_type = child
            .file_type()
            .map_err(|e| DigestError::io(&child_path, e))?;
        if file_type.is_symlink() {
            log::trace!("Skipping symlink in digest: {}", child_path.display());
            continue;
        }

        let child_digest = if file_type.is_dir() {
            dir_digest_at(&child_path, depth + 1)?
        } else {
            file_digest(&child_path)?
        };

        hasher.update(child.file_name().as_encoded_bytes());
        hasher.update(child_digest.as_bytes());
    }
    Ok(hasher.finalize().to_hex().to_string())
}
