//! Build-input shapes consumed by the external build-input resolver.
//!
//! # Overview
//!
//! A resolver declares its inputs as a single path, an array of paths, or an
//! alias-to-path map. Filtering preserves the declared shape, with one
//! exception mirrored from the upstream build tools this integrates with:
//! a single path that does not survive the filter becomes an empty map, since
//! "single path" has no empty form.
//!
//! Map inputs keep declaration order, which matters for the deterministic
//! "first declared input" fallback in [`crate::session`].

use std::path::{Path, PathBuf};

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A declared build-input set, in one of the three resolver shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildInput {
    /// A single source-file path.
    Single(PathBuf),
    /// An ordered list of source-file paths.
    List(Vec<PathBuf>),
    /// Alias-to-path pairs in declaration order.
    Map(Vec<(String, PathBuf)>),
}

/// Errors from parsing an externally supplied input document.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    /// The document was not valid JSON.
    #[error("Invalid build-input JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON was valid but not one of the three supported shapes.
    #[error("Unsupported build-input shape: {0}")]
    UnsupportedShape(String),
}

impl BuildInput {
    /// True when the input set declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(path) => path.as_os_str().is_empty(),
            Self::List(paths) => paths.is_empty(),
            Self::Map(pairs) => pairs.is_empty(),
        }
    }

    /// Number of declared inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(path) => usize::from(!path.as_os_str().is_empty()),
            Self::List(paths) => paths.len(),
            Self::Map(pairs) => pairs.len(),
        }
    }

    /// Keep only the declared paths for which `keep` returns true.
    ///
    /// List and map shapes filter in place; a single path either survives
    /// unchanged or collapses to an empty map.
    #[must_use]
    pub fn restrict(&self, keep: impl Fn(&Path) -> bool) -> Self {
        match self {
            Self::Single(path) => {
                if keep(path) {
                    Self::Single(path.clone())
                } else {
                    Self::Map(Vec::new())
                }
            }
            Self::List(paths) => {
                Self::List(paths.iter().filter(|p| keep(p)).cloned().collect())
            }
            Self::Map(pairs) => Self::Map(
                pairs
                    .iter()
                    .filter(|(_, path)| keep(path))
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// The first declared input in the resolver's native ordering, kept in
    /// its original shape.
    ///
    /// Returns `None` when nothing is declared.
    #[must_use]
    pub fn first_declared(&self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }
        Some(match self {
            Self::Single(path) => Self::Single(path.clone()),
            Self::List(paths) => Self::List(vec![paths[0].clone()]),
            Self::Map(pairs) => Self::Map(vec![pairs[0].clone()]),
        })
    }

    /// Parse an input document in any of the three JSON shapes:
    /// `"path"`, `["path", ...]`, or `{"alias": "path", ...}`.
    ///
    /// Object key order is preserved as declaration order.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value {
            serde_json::Value::String(path) => Ok(Self::Single(PathBuf::from(path))),
            serde_json::Value::Array(items) => {
                let mut paths = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        serde_json::Value::String(path) => paths.push(PathBuf::from(path)),
                        other => {
                            return Err(InputError::UnsupportedShape(format!(
                                "array element {other} is not a string"
                            )))
                        }
                    }
                }
                Ok(Self::List(paths))
            }
            serde_json::Value::Object(map) => {
                let mut pairs = Vec::with_capacity(map.len());
                for (alias, item) in map {
                    match item {
                        serde_json::Value::String(path) => {
                            pairs.push((alias, PathBuf::from(path)));
                        }
                        other => {
                            return Err(InputError::UnsupportedShape(format!(
                                "value for alias '{alias}' is not a string: {other}"
                            )))
                        }
                    }
                }
                Ok(Self::Map(pairs))
            }
            other => Err(InputError::UnsupportedShape(format!(
                "expected string, array, or object, got {other}"
            ))),
        }
    }
}

impl Serialize for BuildInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(path) => serializer.serialize_str(&path.to_string_lossy()),
            Self::List(paths) => {
                let mut seq = serializer.serialize_seq(Some(paths.len()))?;
                for path in paths {
                    seq.serialize_element(&path.to_string_lossy())?;
                }
                seq.end()
            }
            Self::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (alias, path) in pairs {
                    map.serialize_entry(alias, &path.to_string_lossy())?;
                }
                map.end()
            }
        }
    }
}
