//! Ancestor chain tracked during the walk
//!
//! A growable array of frames mirroring directory nesting: push on enter,
//! pop on leave, peek for the current parent. Each frame carries the
//! folder row loaded or created at enter, the pending cover filename, and
//! the dirty flags consulted when the walker leaves the directory.

use coda_core::types::{Folder, FolderId};

#[derive(Debug)]
pub(crate) struct FolderFrame {
    pub folder: Folder,
    /// Best cover candidate seen so far among this directory's files.
    pub cover: Option<String>,
    /// Row was created this scan.
    pub is_new: bool,
    /// Directory mtime is newer than the stored row (or full scan).
    pub changed: bool,
    /// The album extension has been refreshed by this scan's first
    /// changed track.
    pub album_stamped: bool,
}

impl FolderFrame {
    /// The pending cover starts empty: it is recomputed from this scan's
    /// files so a deleted cover is actually retired, and compared against
    /// the stored value at leave to decide whether the row is dirty.
    pub fn new(folder: Folder, is_new: bool, changed: bool) -> Self {
        Self {
            folder,
            cover: None,
            is_new,
            changed,
            album_stamped: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FolderStack {
    frames: Vec<FolderFrame>,
}

impl FolderStack {
    pub fn push(&mut self, frame: FolderFrame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<FolderFrame> {
        self.frames.pop()
    }

    pub fn peek(&self) -> Option<&FolderFrame> {
        self.frames.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut FolderFrame> {
        self.frames.last_mut()
    }

    /// Folder id of the directory currently being walked.
    pub fn parent_id(&self) -> Option<FolderId> {
        self.frames.last().map(|frame| frame.folder.id)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}
