//! Id aliases for catalog rows

pub type FolderId = i64;
pub type TrackId = i64;
pub type ArtistId = i64;
pub type GenreId = i64;
