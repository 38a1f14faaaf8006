//! Library configuration
//!
//! Deserializable settings consumed by the scanner: music roots, the
//! exclusion pattern, multi-value tag handling, and scan scheduling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A configured music root: an absolute directory, optionally aliased.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootConfig {
    #[serde(default)]
    pub alias: Option<String>,
    pub path: PathBuf,
}

/// How a logical tag that may carry several values is resolved.
///
/// Accepted string forms: `none`, `multi`, `delim <separator>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum MultiValueSetting {
    /// Use the first value only.
    None,
    /// Use the repeated values the tag format already carries.
    Multi,
    /// Split the single value on the given separator.
    Delim(String),
}

impl Default for MultiValueSetting {
    fn default() -> Self {
        Self::None
    }
}

/// Error returned when a multi-value setting string cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid multi-value setting {0:?}, expected \"none\", \"multi\", or \"delim <separator>\"")]
pub struct SettingParseError(String);

impl FromStr for MultiValueSetting {
    type Err = SettingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "none" | "" => Ok(Self::None),
            "multi" => Ok(Self::Multi),
            other => match other.split_once(' ') {
                Some(("delim", sep)) if !sep.is_empty() => Ok(Self::Delim(sep.to_string())),
                _ => Err(SettingParseError(s.to_string())),
            },
        }
    }
}

impl TryFrom<String> for MultiValueSetting {
    type Error = SettingParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MultiValueSetting> for String {
    fn from(setting: MultiValueSetting) -> Self {
        setting.to_string()
    }
}

impl fmt::Display for MultiValueSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Multi => write!(f, "multi"),
            Self::Delim(sep) => write!(f, "delim {sep}"),
        }
    }
}

/// Per-tag multi-value settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MultiValueConfig {
    #[serde(default)]
    pub genre: MultiValueSetting,

    #[serde(default)]
    pub artist: MultiValueSetting,

    #[serde(default)]
    pub album_artist: MultiValueSetting,
}

/// Everything the library sync engine needs to know.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    /// Ordered music roots. At least one is required.
    pub roots: Vec<RootConfig>,

    /// Regular expression matched against root-relative paths; matches are
    /// pruned from the walk. Empty excludes nothing.
    #[serde(default)]
    pub exclude_pattern: String,

    #[serde(default)]
    pub multi_value: MultiValueConfig,

    /// Minutes between periodic scans. 0 disables the timer.
    #[serde(default)]
    pub scan_interval_minutes: u64,

    /// Run a scan when the daemon starts.
    #[serde(default)]
    pub scan_at_start: bool,

    /// Watch the roots for filesystem changes and rescan on events.
    #[serde(default)]
    pub scan_watcher: bool,
}
