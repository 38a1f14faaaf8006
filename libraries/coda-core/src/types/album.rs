//! Album types

use super::{ArtistId, FolderId};
use serde::{Deserialize, Serialize};

/// Album metadata extension of a [`Folder`](super::Folder).
///
/// A folder gains one of these rows the first time a readable track is
/// found directly inside it; purely organizational directories never have
/// one. Keyed by the folder id (one-to-zero-or-one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub folder_id: FolderId,
    pub title: String,
    pub year: Option<i64>,
    pub artist_id: Option<ArtistId>,
    pub created_at: i64,
    pub updated_at: i64,
}
