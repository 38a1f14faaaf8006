//! Genre types

use super::GenreId;
use serde::{Deserialize, Serialize};

/// A genre, deduplicated by exact name. Many-to-many with both folders
/// and tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub created_at: i64,
}
