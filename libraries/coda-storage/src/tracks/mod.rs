//! Track storage

use crate::error::Result;
use coda_core::types::{ArtistId, FolderId, Track, TrackId};
use sqlx::{Row, SqliteConnection};

const COLUMNS: &str = "id, folder_id, filename, artist_id, title, track_number, disc_number, \
                       year, musicbrainz_id, replay_gain_db, replay_gain_peak, length_seconds, \
                       bitrate, size, created_at, updated_at";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Track {
    Track {
        id: row.get("id"),
        folder_id: row.get("folder_id"),
        filename: row.get("filename"),
        artist_id: row.get("artist_id"),
        title: row.get("title"),
        track_number: row.get("track_number"),
        disc_number: row.get("disc_number"),
        year: row.get("year"),
        musicbrainz_id: row.get("musicbrainz_id"),
        replay_gain_db: row.get("replay_gain_db"),
        replay_gain_peak: row.get("replay_gain_peak"),
        length_seconds: row.get("length_seconds"),
        bitrate: row.get("bitrate"),
        size: row.get("size"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Everything written for a track besides its folder and timestamps.
#[derive(Debug)]
pub struct TrackFields<'a> {
    pub filename: &'a str,
    pub artist_id: Option<ArtistId>,
    pub title: &'a str,
    pub track_number: Option<i64>,
    pub disc_number: Option<i64>,
    pub year: Option<i64>,
    pub musicbrainz_id: Option<&'a str>,
    pub replay_gain_db: Option<f64>,
    pub replay_gain_peak: Option<f64>,
    pub length_seconds: i64,
    pub bitrate: i64,
    pub size: i64,
}

/// All tracks directly inside one folder.
pub async fn find_by_folder(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
) -> Result<Vec<Track>> {
    let rows = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM tracks WHERE folder_id = ?"
    ))
    .bind(folder_id)
    .fetch_all(conn)
    .await?;

    Ok(rows.iter().map(from_row).collect())
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM tracks WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Insert a new track row and return its id.
pub async fn create(
    conn: &mut SqliteConnection,
    folder_id: FolderId,
    fields: &TrackFields<'_>,
    now: i64,
) -> Result<TrackId> {
    let result = sqlx::query(
        "INSERT INTO tracks (folder_id, filename, artist_id, title, track_number, disc_number, \
         year, musicbrainz_id, replay_gain_db, replay_gain_peak, length_seconds, bitrate, size, \
         created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(folder_id)
    .bind(fields.filename)
    .bind(fields.artist_id)
    .bind(fields.title)
    .bind(fields.track_number)
    .bind(fields.disc_number)
    .bind(fields.year)
    .bind(fields.musicbrainz_id)
    .bind(fields.replay_gain_db)
    .bind(fields.replay_gain_peak)
    .bind(fields.length_seconds)
    .bind(fields.bitrate)
    .bind(fields.size)
    .bind(now)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Rewrite an existing track row.
pub async fn update(
    conn: &mut SqliteConnection,
    id: TrackId,
    fields: &TrackFields<'_>,
    now: i64,
) -> Result<()> {
    sqlx::query(
        "UPDATE tracks SET filename = ?, artist_id = ?, title = ?, track_number = ?, \
         disc_number = ?, year = ?, musicbrainz_id = ?, replay_gain_db = ?, \
         replay_gain_peak = ?, length_seconds = ?, bitrate = ?, size = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(fields.filename)
    .bind(fields.artist_id)
    .bind(fields.title)
    .bind(fields.track_number)
    .bind(fields.disc_number)
    .bind(fields.year)
    .bind(fields.musicbrainz_id)
    .bind(fields.replay_gain_db)
    .bind(fields.replay_gain_peak)
    .bind(fields.length_seconds)
    .bind(fields.bitrate)
    .bind(fields.size)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;

    Ok(())
}

/// All track ids, for the cleanup seen-set diff.
pub async fn all_ids(conn: &mut SqliteConnection) -> Result<Vec<TrackId>> {
    let rows = sqlx::query("SELECT id FROM tracks").fetch_all(conn).await?;

    Ok(rows.iter().map(|row| row.get("id")).collect())
}

/// Delete tracks by id in bounded chunks. Genre links cascade.
pub async fn delete_many(conn: &mut SqliteConnection, ids: &[TrackId]) -> Result<u64> {
    crate::delete_by_ids(conn, "tracks", ids).await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM tracks")
        .fetch_one(conn)
        .await?;

    Ok(row.get("n"))
}
