//! Music root validation
//!
//! Roots come from configuration; anything wrong with one is a fatal
//! setup error, not a per-scan error.

use crate::{Result, ScanError};
use coda_core::config::RootConfig;
use std::path::{Path, PathBuf};

/// A validated music root.
#[derive(Debug, Clone)]
pub struct RootDir {
    pub alias: Option<String>,
    pub path: PathBuf,
}

/// The ordered set of validated roots. Seeds one top-level folder per
/// entry.
#[derive(Debug, Clone)]
pub struct RootSet {
    roots: Vec<RootDir>,
}

impl RootSet {
    /// Validate the configured roots: absolute, existing, readable
    /// directories, no duplicates.
    pub fn resolve(configs: &[RootConfig]) -> Result<Self> {
        if configs.is_empty() {
            return Err(ScanError::invalid_root("", "no music roots configured"));
        }

        let mut roots: Vec<RootDir> = Vec::with_capacity(configs.len());
        for config in configs {
            let path = &config.path;
            if !path.is_absolute() {
                return Err(ScanError::invalid_root(path, "path is not absolute"));
            }
            let meta = std::fs::metadata(path)
                .map_err(|e| ScanError::invalid_root(path, e.to_string()))?;
            if !meta.is_dir() {
                return Err(ScanError::invalid_root(path, "not a directory"));
            }
            // Probe readability up front so it fails here, not mid-walk
            std::fs::read_dir(path).map_err(|e| ScanError::invalid_root(path, e.to_string()))?;

            if roots.iter().any(|r| r.path == *path) {
                return Err(ScanError::invalid_root(path, "duplicate root"));
            }
            roots.push(RootDir {
                alias: config.alias.clone(),
                path: path.clone(),
            });
        }

        Ok(Self { roots })
    }

    pub fn iter(&self) -> impl Iterator<Item = &RootDir> {
        self.roots.iter()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Paths of all roots, for the watcher.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|r| r.path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(path: &Path) -> RootConfig {
        RootConfig {
            alias: None,
            path: path.to_path_buf(),
        }
    }

    #[test]
    fn test_resolve_valid_root() {
        let temp = TempDir::new().unwrap();
        let set = RootSet::resolve(&[config(temp.path())]).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let result = RootSet::resolve(&[config(Path::new("/nonexistent/music/root"))]);
        assert!(matches!(result, Err(ScanError::InvalidRoot { .. })));
    }

    #[test]
    fn test_relative_root_is_fatal() {
        let result = RootSet::resolve(&[config(Path::new("relative/music"))]);
        assert!(matches!(result, Err(ScanError::InvalidRoot { .. })));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();
        let result = RootSet::resolve(&[config(&file)]);
        assert!(matches!(result, Err(ScanError::InvalidRoot { .. })));
    }

    #[test]
    fn test_duplicate_root_is_fatal() {
        let temp = TempDir::new().unwrap();
        let result = RootSet::resolve(&[config(temp.path()), config(temp.path())]);
        assert!(matches!(result, Err(ScanError::InvalidRoot { .. })));
    }

    #[test]
    fn test_empty_root_set_is_fatal() {
        assert!(RootSet::resolve(&[]).is_err());
    }
}
