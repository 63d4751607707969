//! entrycache - Incremental Rebuild Detection
//!
//! A content-fingerprint diff engine for incremental builds: it hashes the
//! files under a public root and the entry directories under an entries root
//! (BLAKE3), persists the snapshots across runs, classifies every path as
//! added/edited/deleted, and narrows the declared build-input set to the
//! entries actually affected.

pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod diff;
pub mod digest;
pub mod error;
pub mod fsutil;
pub mod input;
pub mod logging;
pub mod session;
pub mod snapshot;

pub use app::run_app;
pub use cache::CacheRecord;
pub use diff::{diff_all, diff_category, CategoryDiff, DiffResult};
pub use input::BuildInput;
pub use session::{BuildPlan, BuildSession};
pub use snapshot::{Category, Snapshot};
