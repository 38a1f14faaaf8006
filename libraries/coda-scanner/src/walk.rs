//! Tree walker
//!
//! Depth-first traversal of each root with a pre-order "enter" and a
//! post-order "leave" event per directory. Directory-ness is decided with
//! `fs::metadata`, so a symlink to a directory is followed and its
//! contents are cataloged under the symlink's own location.
//!
//! Within a directory, subdirectories are walked before the directory's
//! own files. Sibling order is unspecified by contract, and this ordering
//! guarantees that the folder-scoped unit of work (opened on the first
//! changed track, committed at the leave event) never nests inside an
//! ancestor's: SQLite allows a single writer.

use crate::roots::RootDir;
use crate::scan::{ScanState, Scanner};
use crate::stack::FolderFrame;
use crate::upsert;
use crate::{Result, ScanError};
use coda_core::types::Track;
use sqlx::{Connection, SqliteConnection};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

const COVER_BASENAMES: &[&str] = &["cover", "folder", "album", "front"];
const COVER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A file queued for (re-)processing inside one folder.
struct TrackUpdate {
    path: PathBuf,
    filename: String,
    size: i64,
    existing: Option<Track>,
}

/// Walk one configured root from its top-level directory.
pub(crate) async fn walk_root(
    scanner: &Scanner,
    conn: &mut SqliteConnection,
    st: &mut ScanState,
    root: &RootDir,
) -> Result<()> {
    let meta = std::fs::metadata(&root.path)?;
    walk_folder(
        scanner,
        conn,
        st,
        root,
        root.path.clone(),
        String::new(),
        mtime_secs(&meta),
    )
    .await
}

/// Recursive walk of one directory: enter, children, own files, leave.
fn walk_folder<'a>(
    scanner: &'a Scanner,
    conn: &'a mut SqliteConnection,
    st: &'a mut ScanState,
    root: &'a RootDir,
    dir: PathBuf,
    rel: String,
    mtime: Option<i64>,
) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let now = chrono::Utc::now().timestamp();
        tracing::debug!(path = %dir.display(), "processing folder");

        // ---- enter: load or create the folder row ----
        let root_dir = root.path.to_string_lossy();
        let (left, right) = split_rel(&rel);
        let (folder, is_new) = match st.stack.parent_id() {
            None => match coda_storage::folders::find_root(&mut *conn, &root_dir).await? {
                Some(folder) => (folder, false),
                None => (
                    coda_storage::folders::create(
                        &mut *conn,
                        &coda_storage::folders::NewFolder {
                            parent_id: None,
                            root_dir: Some(root_dir.as_ref()),
                            root_alias: root.alias.as_deref(),
                            left_path: &left,
                            right_path: &right,
                        },
                        now,
                    )
                    .await?,
                    true,
                ),
            },
            Some(parent_id) => {
                match coda_storage::folders::find_child(&mut *conn, parent_id, &right).await? {
                    Some(folder) => (folder, false),
                    None => (
                        coda_storage::folders::create(
                            &mut *conn,
                            &coda_storage::folders::NewFolder {
                                parent_id: Some(parent_id),
                                root_dir: None,
                                root_alias: None,
                                left_path: &left,
                                right_path: &right,
                            },
                            now,
                        )
                        .await?,
                        true,
                    ),
                }
            }
        };

        let folder_id = folder.id;
        let changed = st.full || is_new || mtime.map_or(true, |m| m > folder.updated_at);
        st.seen_folders.insert(folder_id);
        st.stack.push(FolderFrame::new(folder, is_new, changed));

        // ---- classify children ----
        let mut subdirs: Vec<(PathBuf, String, Option<i64>)> = Vec::new();
        let mut track_files: Vec<(PathBuf, String, Option<i64>, i64)> = Vec::new();

        match std::fs::read_dir(&dir) {
            Err(e) => st.errors.push(dir.clone(), ScanError::Io(e)),
            Ok(entries) => {
                for entry in entries {
                    let entry = match entry {
                        Ok(entry) => entry,
                        Err(e) => {
                            st.errors.push(dir.clone(), ScanError::Io(e));
                            continue;
                        }
                    };
                    let name = entry.file_name().to_string_lossy().into_owned();
                    let child_rel = if rel.is_empty() {
                        name.clone()
                    } else {
                        format!("{rel}/{name}")
                    };
                    if scanner.filter.matches(&child_rel) {
                        tracing::debug!(path = %child_rel, "excluded");
                        continue;
                    }

                    let path = entry.path();
                    // Stat, not lstat: symlinked directories count as directories
                    let meta = match std::fs::metadata(&path) {
                        Ok(meta) => meta,
                        Err(e) => {
                            // Vanished between listing and stat
                            st.errors.push(path, ScanError::Io(e));
                            continue;
                        }
                    };

                    if meta.is_dir() {
                        subdirs.push((path, child_rel, mtime_secs(&meta)));
                    } else if is_cover(&name) {
                        if let Some(frame) = st.stack.peek_mut() {
                            if better_cover(frame.cover.as_deref(), &name) {
                                frame.cover = Some(name);
                            }
                        }
                    } else if scanner.tag_reader.can_read(&path) {
                        track_files.push((path, name, mtime_secs(&meta), meta.len() as i64));
                    }
                }
            }
        }

        // ---- subdirectories ----
        // A failing subtree is recorded and skipped, never fatal; any
        // frames the failed child left behind are unwound
        let depth = st.stack.len();
        for (path, child_rel, child_mtime) in subdirs {
            let child_path = path.clone();
            if let Err(error) =
                walk_folder(scanner, conn, st, root, path, child_rel, child_mtime).await
            {
                tracing::warn!(path = %child_path.display(), %error, "skipping subtree");
                st.errors.push(child_path, error);
                while st.stack.len() > depth {
                    st.stack.pop();
                }
            }
        }

        // ---- this directory's own tracks ----
        // Sorted so the folder's "first track" is deterministic
        track_files.sort_by(|a, b| a.1.cmp(&b.1));

        let mut existing: HashMap<String, Track> =
            coda_storage::tracks::find_by_folder(&mut *conn, folder_id)
                .await?
                .into_iter()
                .map(|track| (track.filename.clone(), track))
                .collect();

        let mut updates: Vec<TrackUpdate> = Vec::new();
        for (path, filename, file_mtime, size) in track_files {
            let existing_track = existing.remove(&filename);
            if let Some(track) = &existing_track {
                // Unchanged rows still count as seen
                st.seen_tracks.insert(track.id);
            }
            let changed = st.full
                || existing_track
                    .as_ref()
                    .map_or(true, |track| file_mtime.map_or(true, |m| m > track.updated_at));
            if !changed {
                continue;
            }
            updates.push(TrackUpdate {
                path,
                filename,
                size,
                existing: existing_track,
            });
        }

        // Unit of work for this folder's tracks, opened only when the
        // first one actually needs processing
        let mut uow = None;
        if !updates.is_empty() {
            uow = Some(conn.begin().await?);
        }

        let mut pending: Vec<upsert::TrackOutcome> = Vec::new();
        let mut storage_failed = false;
        if let Some(tx) = uow.as_mut() {
            for update in updates {
                let Some(frame) = st.stack.peek_mut() else {
                    break;
                };
                let result = upsert::process_track(
                    &mut **tx,
                    scanner.tag_reader.as_ref(),
                    &scanner.multi_value,
                    frame,
                    update.existing.as_ref(),
                    &update.path,
                    &update.filename,
                    update.size,
                    now,
                )
                .await;
                match result {
                    Ok(outcome) => pending.push(outcome),
                    Err(error @ ScanError::TagRead(_)) => {
                        tracing::warn!(path = %update.path.display(), %error, "skipping track");
                        st.errors.push(update.path, error);
                    }
                    Err(error) => {
                        // Storage failure: the folder's unit of work
                        // bounds the blast radius
                        tracing::warn!(path = %update.path.display(), %error, "folder writes failed");
                        st.errors.push(update.path, error);
                        storage_failed = true;
                        break;
                    }
                }
            }
        }

        // ---- leave: pop and persist ----
        let Some(frame) = st.stack.pop() else {
            return Ok(());
        };
        let dirty = frame.is_new || frame.changed || frame.cover != frame.folder.cover;

        // Whether the folder visit still needs to be recorded directly on
        // `conn` (autocommit) after the transaction has been consumed. In
        // the success path the visit is written inside the transaction
        // instead, so this stays false.
        let mut visit_on_conn = false;
        {
            // Move the unit of work into a binding owned by this inner
            // block so its residual destructor (which holds `conn`'s
            // borrow) runs at the closing brace below, freeing `conn`
            // before the direct autocommit visit.
            let taken = uow;
            match taken {
                Some(mut tx) => {
                    if storage_failed {
                        tx.rollback().await?;
                        visit_on_conn = dirty;
                    } else {
                        if dirty {
                            coda_storage::folders::save_visit(
                                &mut *tx,
                                folder_id,
                                frame.cover.as_deref(),
                                now,
                            )
                            .await?;
                        }
                        tx.commit().await?;
                        for outcome in pending {
                            st.seen_tracks.insert(outcome.id);
                            if outcome.created {
                                st.new_tracks += 1;
                            }
                        }
                    }
                }
                None => {
                    visit_on_conn = dirty;
                }
            }
        }

        // The transaction (if any) has been committed or rolled back, so
        // `conn` is free to borrow again here.
        if visit_on_conn {
            coda_storage::folders::save_visit(&mut *conn, folder_id, frame.cover.as_deref(), now)
                .await?;
        }

        Ok(())
    })
}

/// Split a root-relative path into (enclosing path, own name). The root
/// itself is ("", ".").
fn split_rel(rel: &str) -> (String, String) {
    if rel.is_empty() {
        return (String::new(), ".".to_string());
    }
    match rel.rfind('/') {
        Some(i) => (rel[..=i].to_string(), rel[i + 1..].to_string()),
        None => (String::new(), rel.to_string()),
    }
}

/// Modification time as unix seconds; `None` when the filesystem cannot
/// report one (which callers treat as "changed").
fn mtime_secs(meta: &std::fs::Metadata) -> Option<i64> {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
}

/// Whether the filename is one of the recognized cover images.
pub(crate) fn is_cover(name: &str) -> bool {
    cover_priority(name).is_some()
}

fn cover_priority(name: &str) -> Option<usize> {
    let lower = name.to_lowercase();
    let (stem, ext) = lower.rsplit_once('.')?;
    let base = COVER_BASENAMES.iter().position(|c| *c == stem)?;
    let ext = COVER_EXTENSIONS.iter().position(|c| *c == ext)?;
    Some(base * COVER_EXTENSIONS.len() + ext)
}

/// Whether `candidate` should replace the current pending cover.
fn better_cover(current: Option<&str>, candidate: &str) -> bool {
    match (current.and_then(cover_priority), cover_priority(candidate)) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(current), Some(candidate)) => candidate < current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rel() {
        assert_eq!(split_rel(""), (String::new(), ".".to_string()));
        assert_eq!(split_rel("artist"), (String::new(), "artist".to_string()));
        assert_eq!(
            split_rel("artist/album"),
            ("artist/".to_string(), "album".to_string())
        );
        assert_eq!(
            split_rel("a/b/c"),
            ("a/b/".to_string(), "c".to_string())
        );
    }

    #[test]
    fn test_is_cover() {
        assert!(is_cover("cover.jpg"));
        assert!(is_cover("Cover.JPG"));
        assert!(is_cover("folder.png"));
        assert!(is_cover("front.jpeg"));
        assert!(!is_cover("cover.gif"));
        assert!(!is_cover("back.jpg"));
        assert!(!is_cover("cover"));
    }

    #[test]
    fn test_better_cover_prefers_earlier_basename() {
        assert!(better_cover(None, "front.jpg"));
        assert!(better_cover(Some("front.jpg"), "cover.jpg"));
        assert!(!better_cover(Some("cover.jpg"), "front.jpg"));
        assert!(!better_cover(Some("cover.png"), "cover.jpg"));
        assert!(!better_cover(Some("cover.jpg"), "notacover.txt"));
    }
}
