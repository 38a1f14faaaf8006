//! Coda Core
//!
//! Shared domain types and configuration for the Coda music server.
//!
//! This crate defines:
//! - **Catalog Types**: `Folder`, `Album`, `Track`, `Artist`, `Genre`
//! - **Configuration**: library roots, exclusion pattern, multi-value tag
//!   settings, and scan scheduling flags

#![forbid(unsafe_code)]

pub mod config;
pub mod types;

pub use config::{
    LibraryConfig, MultiValueConfig, MultiValueSetting, RootConfig, SettingParseError,
};
pub use types::{
    Album, Artist, ArtistId, Folder, FolderId, Genre, GenreId, Track, TrackId,
};
