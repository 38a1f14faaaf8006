//! Metadata extraction boundary
//!
//! The scanner talks to audio files only through [`TagReader`]:
//! `can_read` decides whether a file is a recognized audio type,
//! `read` returns the audio properties and the raw string values per
//! logical tag key. The production implementation is [`LoftyReader`];
//! tests substitute a deterministic reader.

use crate::{Result, ScanError};
use lofty::{Accessor, AudioFile, ItemKey, Probe, TaggedFileExt};
use std::collections::HashMap;
use std::path::Path;

/// Supported audio file extensions
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "wav", "aac", "m4a", "opus"];

/// Logical tag keys the scanner understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    TrackNumber,
    DiscNumber,
    Year,
    MusicBrainzRecordingId,
    ReplayGainTrackGain,
    ReplayGainTrackPeak,
}

/// Zero-or-more string values per logical tag key.
#[derive(Debug, Clone, Default)]
pub struct RawTags {
    values: HashMap<TagKey, Vec<String>>,
}

impl RawTags {
    /// Append a value for a key; blank values are dropped.
    pub fn push(&mut self, key: TagKey, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.values.entry(key).or_default().push(value);
        }
    }

    /// First value for a key, if any.
    pub fn first(&self, key: TagKey) -> Option<&str> {
        self.values
            .get(&key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values for a key.
    pub fn all(&self, key: TagKey) -> &[String] {
        self.values.get(&key).map_or(&[], Vec::as_slice)
    }
}

/// Audio properties calculated from the file rather than its tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Properties {
    pub length_seconds: u64,
    pub bitrate: u32,
}

/// Everything `read` extracts from one file.
#[derive(Debug, Clone, Default)]
pub struct TagFile {
    pub properties: Properties,
    pub tags: RawTags,
}

/// The metadata extraction boundary.
pub trait TagReader: Send + Sync {
    /// Whether this file looks like a readable audio file.
    fn can_read(&self, path: &Path) -> bool;

    /// Read audio properties and raw tag values from one file.
    fn read(&self, path: &Path) -> Result<TagFile>;
}

/// Whether the path carries one of the supported audio extensions.
pub(crate) fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// `lofty`-backed tag reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyReader;

impl TagReader for LoftyReader {
    fn can_read(&self, path: &Path) -> bool {
        has_audio_extension(path)
    }

    fn read(&self, path: &Path) -> Result<TagFile> {
        let tagged_file = Probe::open(path)
            .map_err(|e| ScanError::TagRead(format!("failed to open file: {e}")))?
            .read()
            .map_err(|e| ScanError::TagRead(format!("failed to read file: {e}")))?;

        let properties = tagged_file.properties();
        let mut file = TagFile {
            properties: Properties {
                length_seconds: properties.duration().as_secs(),
                bitrate: properties.audio_bitrate().unwrap_or(0),
            },
            tags: RawTags::default(),
        };

        // Prefer the primary tag (ID3v2 for MP3, Vorbis for OGG/FLAC)
        let Some(tag) = tagged_file.primary_tag().or(tagged_file.first_tag()) else {
            return Ok(file);
        };

        let tags = &mut file.tags;
        if let Some(title) = tag.title() {
            tags.push(TagKey::Title, title.to_string());
        }
        if let Some(album) = tag.album() {
            tags.push(TagKey::Album, album.to_string());
        }
        for artist in tag.get_strings(&ItemKey::TrackArtist) {
            tags.push(TagKey::Artist, artist);
        }
        for album_artist in tag.get_strings(&ItemKey::AlbumArtist) {
            tags.push(TagKey::AlbumArtist, album_artist);
        }
        for genre in tag.get_strings(&ItemKey::Genre) {
            tags.push(TagKey::Genre, genre);
        }
        if let Some(track) = tag.track() {
            tags.push(TagKey::TrackNumber, track.to_string());
        }
        if let Some(disc) = tag.disk() {
            tags.push(TagKey::DiscNumber, disc.to_string());
        }
        if let Some(year) = tag.year() {
            tags.push(TagKey::Year, year.to_string());
        }
        if let Some(id) = tag.get_string(&ItemKey::MusicBrainzRecordingId) {
            tags.push(TagKey::MusicBrainzRecordingId, id);
        }
        if let Some(gain) = tag.get_string(&ItemKey::ReplayGainTrackGain) {
            tags.push(TagKey::ReplayGainTrackGain, gain);
        }
        if let Some(peak) = tag.get_string(&ItemKey::ReplayGainTrackPeak) {
            tags.push(TagKey::ReplayGainTrackPeak, peak);
        }

        Ok(file)
    }
}
