mod album;
mod artist;
mod folder;
mod genre;
mod ids;
mod track;

pub use album::Album;
pub use artist::Artist;
pub use folder::Folder;
pub use genre::Genre;
pub use ids::{ArtistId, FolderId, GenreId, TrackId};
pub use track::Track;
