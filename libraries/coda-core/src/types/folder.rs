//! Folder types

use super::FolderId;
use serde::{Deserialize, Serialize};

/// One row per filesystem directory under a configured root.
///
/// The path is stored split: `left_path` is the enclosing path relative to
/// the root (with a trailing separator), `right_path` the directory's own
/// name. The root directory itself is stored as `left_path = ""`,
/// `right_path = "."`, with `root_dir`/`root_alias` stamped on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub parent_id: Option<FolderId>,
    pub root_dir: Option<String>,
    pub root_alias: Option<String>,
    pub left_path: String,
    pub right_path: String,
    pub cover: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Folder {
    /// Path of this folder relative to its root.
    pub fn rel_path(&self) -> String {
        if self.right_path == "." {
            String::new()
        } else {
            format!("{}{}", self.left_path, self.right_path)
        }
    }
}
