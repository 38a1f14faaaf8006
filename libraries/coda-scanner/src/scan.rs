//! Scan orchestration
//!
//! One `Scanner` serves every trigger source (manual, timer, watcher).
//! An atomic flag enforces at most one scan at a time across all of them;
//! a losing trigger observes the conflict and returns immediately.

use crate::error::AggregateError;
use crate::filter::ExcludeFilter;
use crate::roots::RootSet;
use crate::stack::FolderStack;
use crate::tags::{LoftyReader, TagReader};
use crate::{clean, walk, Result, ScanError};
use coda_core::config::{LibraryConfig, MultiValueConfig};
use coda_core::types::{FolderId, TrackId};
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Options for one scan run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Bypass change detection and re-process every item.
    pub full: bool,
}

/// Rows removed by the cleanup pass, per entity kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemovedCounts {
    pub tracks: u64,
    pub folders: u64,
    pub albums: u64,
    pub artists: u64,
    pub genres: u64,
}

/// Result of one completed scan-and-clean run.
///
/// `errors` aggregates every per-item failure; the run itself completed,
/// so callers can tell "finished with N bad files" apart from "could not
/// run" (which is a `ScanError` instead).
#[derive(Debug)]
pub struct ScanSummary {
    /// Tracks whose rows were touched (marked seen) this run.
    pub seen_tracks: usize,
    /// Folders marked seen this run.
    pub seen_folders: usize,
    /// Tracks whose rows were created this run.
    pub new_tracks: usize,
    pub removed: RemovedCounts,
    pub errors: AggregateError,
}

/// Per-run mutable state: the ancestor stack, the seen-sets the cleanup
/// pass diffs against, counters, and collected item errors.
#[derive(Debug, Default)]
pub(crate) struct ScanState {
    pub full: bool,
    pub stack: FolderStack,
    pub seen_folders: HashSet<FolderId>,
    pub seen_tracks: HashSet<TrackId>,
    pub new_tracks: usize,
    pub errors: AggregateError,
}

impl ScanState {
    fn new(full: bool) -> Self {
        Self {
            full,
            ..Self::default()
        }
    }
}

/// The library synchronization engine.
pub struct Scanner {
    pub(crate) pool: SqlitePool,
    pub(crate) roots: RootSet,
    pub(crate) filter: ExcludeFilter,
    pub(crate) multi_value: MultiValueConfig,
    pub(crate) tag_reader: Arc<dyn TagReader>,
    scanning: AtomicBool,
}

impl Scanner {
    /// Build a scanner from validated configuration.
    ///
    /// # Errors
    ///
    /// Fails fast on an invalid root or exclude pattern; nothing is
    /// scanned.
    pub fn new(
        pool: SqlitePool,
        config: &LibraryConfig,
        tag_reader: Arc<dyn TagReader>,
    ) -> Result<Self> {
        let roots = RootSet::resolve(&config.roots)?;
        let filter = ExcludeFilter::new(&config.exclude_pattern)?;

        Ok(Self {
            pool,
            roots,
            filter,
            multi_value: config.multi_value.clone(),
            tag_reader,
            scanning: AtomicBool::new(false),
        })
    }

    /// Build a scanner reading tags with `lofty`.
    pub fn with_lofty(pool: SqlitePool, config: &LibraryConfig) -> Result<Self> {
        Self::new(pool, config, Arc::new(LoftyReader))
    }

    pub fn roots(&self) -> &RootSet {
        &self.roots
    }

    /// Whether a scan is currently running.
    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    /// Claim the single-flight flag, or report the conflict.
    fn try_begin(&self) -> Result<ScanGuard<'_>> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ScanError::AlreadyScanning);
        }
        Ok(ScanGuard {
            scanning: &self.scanning,
        })
    }

    /// One full walk-plus-cleanup run.
    ///
    /// Per-item failures never abort the run; they are collected into the
    /// summary. A scan already in flight, or a storage failure outside
    /// any folder's unit of work, is returned as an error instead.
    pub async fn scan_and_clean(&self, options: ScanOptions) -> Result<ScanSummary> {
        let _guard = self.try_begin()?;
        let start = Instant::now();

        tracing::info!(full = options.full, "starting scan");

        let mut conn = self.pool.acquire().await?;
        let mut state = ScanState::new(options.full);

        for root in self.roots.iter() {
            walk::walk_root(self, &mut conn, &mut state, root).await?;
        }

        let removed = clean::clean(&mut conn, &state).await?;

        let finished_at = chrono::Utc::now().timestamp();
        coda_storage::settings::set(
            &mut conn,
            coda_storage::LAST_SCAN_TIME,
            &finished_at.to_string(),
        )
        .await?;

        let summary = ScanSummary {
            seen_tracks: state.seen_tracks.len(),
            seen_folders: state.seen_folders.len(),
            new_tracks: state.new_tracks,
            removed,
            errors: state.errors,
        };

        tracing::info!(
            seen = summary.seen_tracks,
            new = summary.new_tracks,
            removed_tracks = summary.removed.tracks,
            removed_folders = summary.removed.folders,
            errors = summary.errors.len(),
            elapsed = ?start.elapsed(),
            "finished scan"
        );

        Ok(summary)
    }
}

/// Releases the single-flight flag when the scan ends, however it ends.
struct ScanGuard<'a> {
    scanning: &'a AtomicBool,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.scanning.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight_guard() {
        let scanning = AtomicBool::new(false);
        assert!(scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok());
        {
            let _guard = ScanGuard {
                scanning: &scanning,
            };
            assert!(scanning.load(Ordering::SeqCst));
        }
        assert!(!scanning.load(Ordering::SeqCst));
    }
}
