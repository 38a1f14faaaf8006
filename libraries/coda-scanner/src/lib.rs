//! Coda Library Scanner
//!
//! Walks the configured music roots and reconciles them into the catalog,
//! keeping it consistent across repeated runs as files are added, edited,
//! moved, or deleted.
//!
//! # Architecture
//!
//! - `roots`: validation of configured music roots
//! - `filter`: exclude-pattern pruning
//! - `tags`: metadata extraction boundary (`TagReader`) and the `lofty`
//!   implementation
//! - `policy`: multi-value tag resolution
//! - `stack`: ancestor chain tracked during the walk
//! - `walk`: depth-first traversal with enter/leave events, change
//!   detection, and folder-scoped units of work
//! - `upsert`: folder/album/track/artist/genre row population
//! - `clean`: post-walk garbage collection of unseen rows
//! - `scan`: the orchestrator (single-flight, result aggregation)
//! - `watch`: filesystem-watch and interval triggers

mod clean;
mod error;
mod stack;
mod upsert;
mod walk;

pub mod filter;
pub mod policy;
pub mod roots;
pub mod scan;
pub mod tags;
pub mod watch;

pub use error::{AggregateError, ItemError, ScanError};
pub use scan::{RemovedCounts, ScanOptions, ScanSummary, Scanner};
pub use tags::{LoftyReader, Properties, RawTags, TagFile, TagKey, TagReader};

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, ScanError>;
