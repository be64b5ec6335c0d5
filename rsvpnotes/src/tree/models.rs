//! Tree models
//!
//! Rust structs for the folder/note hierarchy.
//! Field names are camelCase on the wire so persisted data keeps the
//! `folderId` / `previousFolderId` / `parentId` schema.

use crate::config::TRASH_SENTINEL;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a note lives: at the root, inside a folder, or in the trash.
///
/// Persisted as the nullable `folderId` string, with the reserved
/// `"TRASH"` value standing for the trash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Location {
    #[default]
    Root,
    Folder(String),
    Trash,
}

impl Location {
    /// Location for a (possibly absent) parent folder id
    pub fn from_parent(parent_id: Option<&str>) -> Self {
        match parent_id {
            Some(id) => Location::Folder(id.to_string()),
            None => Location::Root,
        }
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, Location::Trash)
    }

    /// Folder id when the location is a folder
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Location::Folder(id) => Some(id),
            _ => None,
        }
    }
}

impl From<Option<String>> for Location {
    fn from(value: Option<String>) -> Self {
        match value {
            None => Location::Root,
            Some(s) if s == TRASH_SENTINEL => Location::Trash,
            Some(s) => Location::Folder(s),
        }
    }
}

impl From<Location> for Option<String> {
    fn from(value: Location) -> Self {
        match value {
            Location::Root => None,
            Location::Folder(id) => Some(id),
            Location::Trash => Some(TRASH_SENTINEL.to_string()),
        }
    }
}

/// A note with rich text content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Rich text owned by the editor; JSON-encoded Quill Delta by default
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub folder_id: Location,
    /// Pre-trash folder, present only while `folder_id` is the trash
    #[serde(default)]
    pub previous_folder_id: Option<String>,
    #[serde(default)]
    pub order: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn is_trashed(&self) -> bool {
        self.folder_id.is_trash()
    }
}

/// A folder in the note tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// `None` means the folder sits at the root
    #[serde(default)]
    pub parent_id: Option<String>,
    /// UI-only; has no effect on the tree
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub order: i64,
}

/// Partial update for a note. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub order: Option<i64>,
}

/// Partial update for a folder. Reparenting goes through `move_folder`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub collapsed: Option<bool>,
    pub order: Option<i64>,
}

/// Everything exchanged with the persistence collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Canonical collections plus the active selection, handed to renderers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub folders: Vec<Folder>,
    pub notes: Vec<Note>,
    pub active_note_id: Option<String>,
}

/// Direct children of one parent, each list sorted by `order`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderContents {
    pub folders: Vec<Folder>,
    pub notes: Vec<Note>,
}

/// What `delete_note` did to its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Moved into the trash; restorable
    Trashed,
    /// Removed from the collection for good
    Purged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_round_trips_through_folder_id() {
        let json = r#"[null, "abc", "TRASH"]"#;
        let parsed: Vec<Location> = serde_json::from_str(json).unwrap();

        assert_eq!(
            parsed,
            vec![
                Location::Root,
                Location::Folder("abc".to_string()),
                Location::Trash
            ]
        );
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"[null,"abc","TRASH"]"#);
    }

    #[test]
    fn test_note_uses_camel_case_fields() {
        let json = r#"{
            "id": "n1",
            "title": "Hello",
            "content": "",
            "folderId": "TRASH",
            "previousFolderId": "f1",
            "order": 3
        }"#;

        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.is_trashed());
        assert_eq!(note.previous_folder_id.as_deref(), Some("f1"));
        assert_eq!(note.order, 3);

        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["folderId"], "TRASH");
        assert_eq!(value["previousFolderId"], "f1");
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let folder: Folder = serde_json::from_str(r#"{"id":"f1","name":"Work"}"#).unwrap();
        assert_eq!(folder.parent_id, None);
        assert!(!folder.collapsed);
        assert_eq!(folder.order, 0);

        let note: Note = serde_json::from_str(r#"{"id":"n1","title":"T"}"#).unwrap();
        assert_eq!(note.folder_id, Location::Root);
        assert_eq!(note.content, "");
    }
}
