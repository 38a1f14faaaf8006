//! Error types for the scanner

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("a scan is already running")]
    AlreadyScanning,

    #[error("invalid music root {path:?}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not read tags: {0}")]
    TagRead(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] coda_storage::StorageError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl ScanError {
    pub(crate) fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// A non-fatal failure scoped to one file or directory.
#[derive(Debug)]
pub struct ItemError {
    pub path: PathBuf,
    pub error: ScanError,
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Every per-item failure of one run, combined.
///
/// A completed scan returns this alongside its counters so callers can
/// tell "finished with N bad files" apart from "could not run".
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<ItemError>,
}

impl AggregateError {
    pub(crate) fn push(&mut self, path: PathBuf, error: ScanError) {
        self.errors.push(ItemError { path, error });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemError> {
        self.errors.iter()
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} item(s) failed", self.errors.len())?;
        for err in &self.errors {
            write!(f, "\n{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
