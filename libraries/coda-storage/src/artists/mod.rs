//! Artist storage

use crate::error::Result;
use coda_core::types::Artist;
use sqlx::{Row, SqliteConnection};

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Artist {
    Artist {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn get_all(conn: &mut SqliteConnection) -> Result<Vec<Artist>> {
    let rows = sqlx::query(
        "SELECT id, name, created_at, updated_at FROM artists ORDER BY name",
    )
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn find_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<Artist>> {
    let row = sqlx::query("SELECT id, name, created_at, updated_at FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Look up an artist by exact name, creating it if missing.
pub async fn find_or_create(
    conn: &mut SqliteConnection,
    name: &str,
    now: i64,
) -> Result<Artist> {
    if let Some(artist) = find_by_name(&mut *conn, name).await? {
        return Ok(artist);
    }

    let result = sqlx::query("INSERT INTO artists (name, created_at, updated_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(now)
        .bind(now)
        .execute(conn)
        .await?;

    Ok(Artist {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    })
}

/// Delete artists referenced by no track and no album. Returns the number
/// of rows removed.
pub async fn delete_orphaned(conn: &mut SqliteConnection) -> Result<u64> {
    let result = sqlx::query(
        "DELETE FROM artists
         WHERE id NOT IN (
             SELECT artist_id FROM tracks WHERE artist_id IS NOT NULL
             UNION
             SELECT artist_id FROM albums WHERE artist_id IS NOT NULL
         )",
    )
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM artists")
        .fetch_one(conn)
        .await?;

    Ok(row.get("n"))
}
