//! Snapshot persistence for entrycache.
//!
//! The cache record is the on-disk form of the previous run's two snapshots,
//! stored as a single JSON document. It is read tolerantly at the start of
//! every run (a missing or corrupt file is a first run, never an error) and
//! replaced wholesale after a successful build.

pub mod store;

pub use store::{CacheError, CacheRecord};
