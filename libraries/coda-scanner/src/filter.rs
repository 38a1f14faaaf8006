//! Exclude-pattern filter
//!
//! One regular expression matched against root-relative paths. Matched
//! directories are pruned without descending; matched files are skipped.
//! Rows previously cataloged under now-excluded paths are not protected:
//! they fall out of the seen-set and the cleanup pass removes them,
//! exactly as if the paths had been deleted from disk.

use crate::Result;
use regex::Regex;

#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    pattern: Option<Regex>,
}

impl ExcludeFilter {
    /// Compile the configured pattern. Empty excludes nothing; an invalid
    /// pattern is a fatal setup error.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self { pattern: None });
        }
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }

    /// Whether the given root-relative path is excluded.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(rel_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_excludes_nothing() {
        let filter = ExcludeFilter::new("").unwrap();
        assert!(!filter.matches("artist/album/track.flac"));
    }

    #[test]
    fn test_matches_relative_path() {
        let filter = ExcludeFilter::new(r"^incoming/|\.part$").unwrap();
        assert!(filter.matches("incoming/new-album"));
        assert!(filter.matches("artist/album/track.flac.part"));
        assert!(!filter.matches("artist/album/track.flac"));
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        assert!(ExcludeFilter::new("[").is_err());
    }
}
