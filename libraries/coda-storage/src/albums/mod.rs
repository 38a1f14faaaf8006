//! Album extension storage
//!
//! A folder that directly contains tracks gains one row here; the row is
//! removed again when the folder loses its last direct track.

use crate::error::Result;
use coda_core::types::{Album, ArtistId, FolderId};
use sqlx::{Row, SqliteConnection};

pub async fn get(conn: &mut SqliteConnection, folder_id: FolderId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT folder_id, title, year, artist_id, created_at, updated_at
         FROM albums
         WHERE folder_id = ?",
    )
    .bind(folder_id)
    .fetch_optional(conn)
    .await?;

    Ok(row.map(|row| Album {
        folder_id: row.get("folder_id"),
        title: row.get("title"),
        year: row.get("year"),
        artist_id: row.get("artist_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }))
}

/// Create or refresh the album extension of a folder.
pub async fn upsert(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
    title: &str,
    year: Option<i64>,
    artist_id: Option<ArtistId>,
    now: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO albums (folder_id, title, year, artist_id, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT (folder_id) DO UPDATE SET
             title = excluded.title,
             year = excluded.year,
             artist_id = excluded.artist_id,
             updated_at = excluded.updated_at",
    )
    .bind(folder_id)
    .bind(title)
    .bind(year)
    .bind(artist_id)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

/// Remove album extensions of folders that no longer directly contain
/// tracks. Returns the number of rows removed.
pub async fn delete_for_trackless_folders(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM albums
         WHERE folder_id NOT IN (SELECT DISTINCT folder_id FROM tracks)",
    )
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM albums")
        .fetch_one(conn)
        .await?;

    Ok(row.get("n"))
}
