//! Folder storage (one row per filesystem directory)

use crate::error::Result;
use coda_core::types::{Folder, FolderId};
use sqlx::{Row, SqliteConnection};

const COLUMNS: &str = "id, parent_id, root_dir, root_alias, left_path, right_path, cover, \
                       created_at, updated_at";

fn from_row(row: &sqlx::sqlite::SqliteRow) -> Folder {
    Folder {
        id: row.get("id"),
        parent_id: row.get("parent_id"),
        root_dir: row.get("root_dir"),
        root_alias: row.get("root_alias"),
        left_path: row.get("left_path"),
        right_path: row.get("right_path"),
        cover: row.get("cover"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Fields needed to create a folder row.
#[derive(Debug)]
pub struct NewFolder<'a> {
    pub parent_id: Option<FolderId>,
    pub root_dir: Option<&'a str>,
    pub root_alias: Option<&'a str>,
    pub left_path: &'a str,
    pub right_path: &'a str,
}

/// Find the top-level folder of a configured root.
pub async fn find_root(conn: &mut SqliteConnection, root_dir: &str) -> Result<Option<Folder>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM folders WHERE parent_id IS NULL AND root_dir = ?"
    ))
    .bind(root_dir)
    .fetch_optional(conn)
    .await?;

    Ok(row.as_ref().map(from_row))
}

/// Find a folder by its parent and name.
pub async fn find_child(
    conn: &mut SqliteConnection,
    parent_id: FolderId,
    right_path: &str,
) -> Result<Option<Folder>> {
    let row = sqlx::query(&format!(
        "SELECT {COLUMNS} FROM folders WHERE parent_id = ? AND right_path = ?"
    ))
    .bind(parent_id)
    .bind(right_path)
    .fetch_optional(conn)
    .await?;

    Ok(row.as_ref().map(from_row))
}

pub async fn get_by_id(conn: &mut SqliteConnection, id: FolderId) -> Result<Option<Folder>> {
    let row = sqlx::query(&format!("SELECT {COLUMNS} FROM folders WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.as_ref().map(from_row))
}

/// Insert a new folder row and return it.
pub async fn create(
    conn: &mut SqliteConnection,
    new: &NewFolder<'_>,
    now: i64,
) -> Result<Folder> {
    let result = sqlx::query(
        "INSERT INTO folders (parent_id, root_dir, root_alias, left_path, right_path, \
         created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(new.parent_id)
    .bind(new.root_dir)
    .bind(new.root_alias)
    .bind(new.left_path)
    .bind(new.right_path)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let id = result.last_insert_rowid();

    Ok(Folder {
        id,
        parent_id: new.parent_id,
        root_dir: new.root_dir.map(str::to_string),
        root_alias: new.root_alias.map(str::to_string),
        left_path: new.left_path.to_string(),
        right_path: new.right_path.to_string(),
        cover: None,
        created_at: now,
        updated_at: now,
    })
}

/// Persist the fields written when the walker leaves a directory.
pub async fn save_visit(
    conn: &mut SqliteConnection,
    id: FolderId,
    cover: Option<&str>,
    now: i64,
) -> Result<()> {
    sqlx::query("UPDATE folders SET cover = ?, updated_at = ? WHERE id = ?")
        .bind(cover)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;

    Ok(())
}

/// All folder ids, for the cleanup seen-set diff.
pub async fn all_ids(conn: &mut SqliteConnection) -> Result<Vec<FolderId>> {
    let rows = sqlx::query("SELECT id FROM folders")
        .fetch_all(conn)
        .await?;

    Ok(rows.iter().map(|row| row.get("id")).collect())
}

/// Delete folders by id in bounded chunks, cascading to child folders,
/// tracks, albums, and genre links. Returns the number of rows removed
/// directly (cascaded children of deleted ancestors are counted by their
/// own ids being in the list).
pub async fn delete_many(conn: &mut SqliteConnection, ids: &[FolderId]) -> Result<u64> {
    crate::delete_by_ids(conn, "folders", ids).await
}

pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM folders")
        .fetch_one(conn)
        .await?;

    Ok(row.get("n"))
}
