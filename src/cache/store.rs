//! Loading and atomic persistence of the snapshot cache file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// The persisted snapshot pair from the previous run.
///
/// Serialized shape: `{ "pub": { "<path>": "<digest>" }, "entries": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Per-file fingerprints under the public root.
    #[serde(rename = "pub", default)]
    pub public: Snapshot,

    /// Per-subtree fingerprints for the entry directories.
    #[serde(default)]
    pub entries: Snapshot,
}

/// Errors that can occur while persisting the cache.
///
/// Loading never errors by design; only `save` can fail.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// The cache file or its temp sibling could not be written.
    #[error("Failed to write cache file {path}: {source}")]
    Write {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The record could not be serialized.
    #[error("Failed to serialize cache record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CacheRecord {
    /// Create a record from freshly built snapshots.
    #[must_use]
    pub fn new(public: Snapshot, entries: Snapshot) -> Self {
        Self { public, entries }
    }

    /// Load the prior record from `path`.
    ///
    /// A missing, empty, or unparseable file is a first run (or a corrupted
    /// cache being discarded) and yields an empty record; this is designed
    /// behavior, never an error surfaced to the caller. The resulting diff is
    /// then a full-change diff instead of a crash.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::debug!("No prior cache at {}: {}", path.display(), e);
                return Self::default();
            }
        };
        if content.trim().is_empty() {
            log::debug!("Prior cache at {} is empty", path.display());
            return Self::default();
        }
        match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "Prior cache at {} is unparseable, treating as empty: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Persist this record to `path`, replacing any prior content in full.
    ///
    /// Missing parent directories are created. The write goes to a temp file
    /// in the same directory and is renamed over the target, so a failure
    /// leaves the prior cache intact.
    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| CacheError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CacheError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| CacheError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;

        log::info!("Snapshots saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sample_record() -> CacheRecord {
        let mut public = Snapshot::new();
        public.insert(PathBuf::from("/project/a.txt"), "aaaa".to_string());
        public.insert(PathBuf::from("/project/b.txt"), "bbbb".to_string());
        let mut entries = Snapshot::new();
        entries.insert(PathBuf::from("/project/pages/x"), "xxxx".to_string());
        CacheRecord::new(public, entries)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let record = CacheRecord::load(&dir.path().join("missing.json"));
        assert_eq!(record, CacheRecord::default());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "  \n").unwrap();

        let record = CacheRecord::load(&path);
        assert_eq!(record, CacheRecord::default());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json at all").unwrap();

        let record = CacheRecord::load(&path);
        assert_eq!(record, CacheRecord::default());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let record = sample_record();

        record.save(&path).unwrap();
        let loaded = CacheRecord::load(&path);

        assert_eq!(loaded, record);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/cache.json");

        sample_record().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_uses_wire_field_names() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        sample_record().save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();

        assert!(content.contains("\"pub\""));
        assert!(content.contains("\"entries\""));
        assert!(content.contains("/project/a.txt"));
    }

    #[test]
    fn test_save_replaces_prior_content_wholesale() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        sample_record().save(&path).unwrap();
        CacheRecord::default().save(&path).unwrap();

        let loaded = CacheRecord::load(&path);
        assert_eq!(loaded, CacheRecord::default());
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        sample_record().save(&path).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cache.json")]);
    }

    #[test]
    fn test_load_tolerates_missing_category() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{ "pub": { "/a": "1234" } }"#).unwrap();

        let record = CacheRecord::load(&path);
        assert_eq!(record.public.len(), 1);
        assert!(record.entries.is_empty());
    }
}
