//! Genre storage and genre links

use crate::error::Result;
use coda_core::types::{FolderId, Genre, GenreId, TrackId};
use sqlx::{Row, SqliteConnection};

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Genre {
    Genre {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<Genre>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM genres ORDER BY name")
        .fetch_all(conn)
        .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<Genre>> {
    let row = sqlx::query("SELECT id, name, created_at FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Look up a genre by exact name, creating it if missing.
pub async fn find_or_create(conn: &mut SqliteConnection, name: &str, now: i64) -> Result<Genre> {
    if let Some(genre) = find_by_name(&mut *conn, name).await? {
        return Ok(genre);
    }

    let result = sqlx::query("INSERT INTO genres (name, created_at) VALUES (?, ?)")
        .bind(name)
        .bind(now)
        .execute(conn)
        .await?;

    Ok(Genre {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        created_at: now,
    })
}

/// All genres linked to a track.
pub async fn get_by_track(conn: &mut SqliteConnection, track_id: TrackId) -> Result<Vec<Genre>> {
    let rows = sqlx::query(
        "SELECT g.id, g.name, g.created_at
         FROM genres g
         INNER JOIN track_genres tg ON g.id = tg.genre_id
         WHERE tg.track_id = ?
         ORDER BY g.name",
    )
    .bind(track_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

/// All genres linked to a folder.
pub async fn get_by_folder(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
) -> Result<Vec<Genre>> {
    let rows = sqlx::query(
        "SELECT g.id, g.name, g.created_at
         FROM genres g
         INNER JOIN folder_genres fg ON g.id = fg.genre_id
         WHERE fg.folder_id = ?
         ORDER BY g.name",
    )
    .bind(folder_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

/// Replace a track's genre links wholesale.
pub async fn set_track_genres(
    conn: &mut SqliteConnection,
    track_id: TrackId,
    genre_ids: &[GenreId],
) -> Result<()> {
    sqlx::query("DELETE FROM track_genres WHERE track_id = ?")
        .bind(track_id)
        .execute(&mut *conn)
        .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO track_genres (track_id, genre_id) VALUES (?, ?)")
            .bind(track_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Replace a folder's genre links wholesale.
pub async fn set_folder_genres(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
    genre_ids: &[GenreId],
) -> Result<()> {
    sqlx::query("DELETE FROM folder_genres WHERE folder_id = ?")
        .bind(folder_id)
        .execute(&mut *conn)
        .await?;

    for genre_id in genre_ids {
        sqlx::query("INSERT OR IGNORE INTO folder_genres (folder_id, genre_id) VALUES (?, ?)")
            .bind(folder_id)
            .bind(genre_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

/// Remove folder genre links of folders that no longer directly contain
/// tracks.
pub async fn delete_links_for_trackless_folders(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM folder_genres
         WHERE folder_id NOT IN (SELECT DISTINCT folder_id FROM tracks)",
    )
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Delete genres linked to no track and no folder. Returns the number of
/// rows removed.
pub async fn delete_orphaned(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM genres
         WHERE id NOT IN (SELECT genre_id FROM track_genres)
           AND id NOT IN (SELECT genre_id FROM folder_genres)",
    )
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM genres")
        .fetch_one(conn)
        .await?;

    Ok(row.get("n"))
}
