//! Track types

use super::{ArtistId, FolderId, TrackId};
use serde::{Deserialize, Serialize};

/// One row per recognized audio file, unique per (folder, filename).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub folder_id: FolderId,
    pub filename: String,
    pub artist_id: Option<ArtistId>,
    pub title: String,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub year: Option<i64>,
    pub musicbrainz_id: Option<String>,
    pub replay_gain_db: Option<f64>,
    pub replay_gain_peak: Option<f64>,
    /// Duration in whole seconds, from audio properties.
    pub length_seconds: i64,
    /// Bitrate in kbps, from audio properties.
    pub bitrate: i64,
    /// File size in bytes.
    pub size: i64,
    pub created_at: i64,
    pub updated_at: i64,
}
