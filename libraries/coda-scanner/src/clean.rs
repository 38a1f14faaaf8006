//! Post-walk garbage collection
//!
//! Everything the walk did not mark seen is deleted, in one transaction:
//! tracks first, then folders (cascading to any remaining children), then
//! album extensions and folder genre links of folders left without direct
//! tracks, then artists and genres nothing references anymore. Id-list
//! deletes are chunked by the storage layer to respect the bind-parameter
//! limit.

use crate::scan::{RemovedCounts, ScanState};
use crate::Result;
use coda_storage::{albums, artists, folders, genres, tracks};
use sqlx::{Connection, SqliteConnection};
use std::time::Instant;

pub(crate) async fn clean(conn: &mut SqliteConnection, st: &ScanState) -> Result<RemovedCounts> {
    let start = Instant::now();
    let mut counts = RemovedCounts::default();
    let mut tx = conn.begin().await?;

    let missing_tracks: Vec<i64> = tracks::all_ids(&mut *tx)
        .await?
        .into_iter()
        .filter(|id| !st.seen_tracks.contains(id))
        .collect();
    counts.tracks = tracks::delete_many(&mut *tx, &missing_tracks).await?;

    let missing_folders: Vec<i64> = folders::all_ids(&mut *tx)
        .await?
        .into_iter()
        .filter(|id| !st.seen_folders.contains(id))
        .collect();
    counts.folders = folders::delete_many(&mut *tx, &missing_folders).await?;

    counts.albums = albums::delete_for_trackless_folders(&mut *tx).await?;
    genres::delete_links_for_trackless_folders(&mut *tx).await?;

    // Reference-counted rows go last, once every dangling link is gone
    counts.artists = artists::delete_orphaned(&mut *tx).await?;
    counts.genres = genres::delete_orphaned(&mut *tx).await?;

    tx.commit().await?;

    tracing::info!(
        tracks = counts.tracks,
        folders = counts.folders,
        albums = counts.albums,
        artists = counts.artists,
        genres = counts.genres,
        elapsed = ?start.elapsed(),
        "finished cleanup"
    );

    Ok(counts)
}
