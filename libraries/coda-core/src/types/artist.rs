//! Artist types

use super::ArtistId;
use serde::{Deserialize, Serialize};

/// An artist, deduplicated by exact name.
///
/// The same entity serves both the album-artist role (referenced from
/// albums) and the track-artist role (referenced from tracks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}
