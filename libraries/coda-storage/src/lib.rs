//! Coda Storage
//!
//! `SQLite` persistence for the Coda catalog.
//!
//! Vertical slices: each entity owns its own queries in its own module.
//! All functions take a `&mut SqliteConnection` so the same code runs
//! against a pooled connection or inside a scan's folder-scoped
//! transaction.

mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod folders;
pub mod genres;
pub mod settings;
pub mod tracks;

pub use error::StorageError;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::str::FromStr;

/// Setting key under which the finish time of the last scan is stored.
pub const LAST_SCAN_TIME: &str = "last_scan_time";

/// Bind-parameter cap for id-list deletes, kept safely below `SQLite`'s
/// default limit of 999.
pub(crate) const BIND_LIMIT: usize = 500;

/// Create a new `SQLite` pool.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30))
        // Cleanup relies on ON DELETE CASCADE
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Run database migrations.
///
/// Migrations are embedded so they run in every execution context without
/// a filesystem dependency.
///
/// # Errors
///
/// Returns an error if a migration statement fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    const MIGRATIONS: &[&str] = &[
        include_str!("../migrations/20250901000001_create_artists.sql"),
        include_str!("../migrations/20250901000002_create_genres.sql"),
        include_str!("../migrations/20250901000003_create_folders.sql"),
        include_str!("../migrations/20250901000004_create_albums.sql"),
        include_str!("../migrations/20250901000005_create_tracks.sql"),
        include_str!("../migrations/20250901000006_create_genre_links.sql"),
        include_str!("../migrations/20250901000007_create_settings.sql"),
    ];

    for migration in MIGRATIONS {
        sqlx::raw_sql(migration)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
    }

    Ok(())
}

/// Delete rows from `table` by id, chunked to respect the bind-parameter
/// limit. Returns the number of rows removed.
pub(crate) async fn delete_by_ids(
    conn: &mut SqliteConnection,
    table: &str,
    ids: &[i64],
) -> Result<u64, StorageError> {
    let mut removed = 0;
    for chunk in ids.chunks(BIND_LIMIT) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = format!("DELETE FROM {table} WHERE id IN ({placeholders})");
        let mut query = sqlx::query(&sql);
        for id in chunk {
            query = query.bind(id);
        }
        removed += query.execute(&mut *conn).await?.rows_affected();
    }
    Ok(removed)
}
