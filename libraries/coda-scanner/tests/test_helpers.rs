//! Shared fixtures for scanner integration tests

use coda_core::config::{LibraryConfig, MultiValueConfig, RootConfig};
use coda_scanner::{ScanError, Scanner, TagFile, TagKey, TagReader};
use sqlx::SqlitePool;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::{Duration, SystemTime};

static INIT: Once = Once::new();

/// File-backed test database; in-memory SQLite does not share state
/// across pooled connections.
pub async fn setup_pool(dir: &Path) -> SqlitePool {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("coda_scanner=debug")
            .try_init();
    });

    let db_path = dir.join("coda.db");
    let pool = coda_storage::create_pool(&format!("sqlite://{}", db_path.display()))
        .await
        .expect("Failed to create test database pool");

    coda_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Tag reader for fixtures: audio files contain `key=value` lines, one
/// value per line, repeated keys allowed. A body containing `!corrupt`
/// fails to read.
pub struct MockTagReader;

impl TagReader for MockTagReader {
    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                ["mp3", "flac", "ogg"].contains(&ext.to_lowercase().as_str())
            })
            .unwrap_or(false)
    }

    fn read(&self, path: &Path) -> coda_scanner::Result<TagFile> {
        let body = fs::read_to_string(path)
            .map_err(|e| ScanError::TagRead(format!("failed to open file: {e}")))?;
        if body.contains("!corrupt") {
            return Err(ScanError::TagRead("corrupt fixture".to_string()));
        }

        let mut file = TagFile::default();
        for line in body.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            match key.trim() {
                "title" => file.tags.push(TagKey::Title, value),
                "artist" => file.tags.push(TagKey::Artist, value),
                "album" => file.tags.push(TagKey::Album, value),
                "albumartist" => file.tags.push(TagKey::AlbumArtist, value),
                "genre" => file.tags.push(TagKey::Genre, value),
                "track" => file.tags.push(TagKey::TrackNumber, value),
                "disc" => file.tags.push(TagKey::DiscNumber, value),
                "year" => file.tags.push(TagKey::Year, value),
                "mbid" => file.tags.push(TagKey::MusicBrainzRecordingId, value),
                "gain" => file.tags.push(TagKey::ReplayGainTrackGain, value),
                "peak" => file.tags.push(TagKey::ReplayGainTrackPeak, value),
                "length" => file.properties.length_seconds = value.parse().unwrap_or(0),
                "bitrate" => file.properties.bitrate = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        Ok(file)
    }
}

/// Library config over the given roots with everything else defaulted.
pub fn library_config(roots: &[&Path]) -> LibraryConfig {
    LibraryConfig {
        roots: roots
            .iter()
            .map(|path| RootConfig {
                alias: None,
                path: path.to_path_buf(),
            })
            .collect(),
        exclude_pattern: String::new(),
        multi_value: MultiValueConfig::default(),
        scan_interval_minutes: 0,
        scan_at_start: false,
        scan_watcher: false,
    }
}

pub fn build_scanner(pool: &SqlitePool, config: &LibraryConfig) -> Scanner {
    Scanner::new(pool.clone(), config, Arc::new(MockTagReader)).expect("Failed to build scanner")
}

/// Write a fixture track, creating parent directories.
pub fn write_track(root: &Path, rel: &str, tags: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directories");
    }
    fs::write(&path, tags).expect("Failed to write fixture track");
    path
}

pub fn write_file(root: &Path, rel: &str, body: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directories");
    }
    fs::write(&path, body).expect("Failed to write fixture file");
    path
}

/// Push a file's mtime into the future so a rescan within the same
/// second still sees it as changed.
pub fn bump_mtime(path: &Path, seconds_ahead: u64) {
    let file = fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open fixture for touching");
    let when = SystemTime::now() + Duration::from_secs(seconds_ahead);
    file.set_times(fs::FileTimes::new().set_modified(when))
        .expect("Failed to set fixture mtime");
}
