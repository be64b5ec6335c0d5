//! In-memory folder/note tree
//!
//! The store owns the canonical note and folder collections. Every
//! operation validates its references before touching anything, so an
//! `Err` always leaves the collections exactly as they were.

use super::models::*;
use crate::config::{DEFAULT_FOLDER_NAME, DEFAULT_NOTE_TITLE};
use crate::error::{AppError, Result};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Position one past the largest sibling order, or 0 without siblings
pub fn next_order(orders: impl IntoIterator<Item = i64>) -> i64 {
    orders.into_iter().max().map_or(0, |max| max + 1)
}

/// Canonical folder and note collections with the active selection
#[derive(Debug, Clone, Default)]
pub struct TreeStore {
    folders: Vec<Folder>,
    notes: Vec<Note>,
    active_note_id: Option<String>,
}

impl TreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted data, repairing dangling references
    /// and parent cycles so the tree invariants hold from the start.
    pub fn from_data(data: AppData) -> Self {
        let AppData { mut folders, mut notes } = data;

        let known: HashSet<String> = folders.iter().map(|f| f.id.clone()).collect();

        for folder in folders.iter_mut() {
            if let Some(parent) = folder.parent_id.as_deref() {
                if !known.contains(parent) {
                    tracing::warn!(
                        "Folder {} points at missing parent {}, moving to root",
                        folder.id,
                        parent
                    );
                    folder.parent_id = None;
                }
            }
        }

        break_parent_cycles(&mut folders);

        for note in notes.iter_mut() {
            if let Location::Folder(folder_id) = &note.folder_id {
                if !known.contains(folder_id) {
                    tracing::warn!(
                        "Note {} points at missing folder {}, moving to root",
                        note.id,
                        folder_id
                    );
                    note.folder_id = Location::Root;
                }
            }
            if !note.is_trashed() && note.previous_folder_id.is_some() {
                tracing::warn!("Clearing stale previousFolderId on note {}", note.id);
                note.previous_folder_id = None;
            }
        }

        let active_note_id = notes
            .iter()
            .find(|n| !n.is_trashed())
            .map(|n| n.id.clone());

        tracing::info!(
            "Loaded tree with {} folders and {} notes",
            folders.len(),
            notes.len()
        );

        Self {
            folders,
            notes,
            active_note_id,
        }
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn active_note_id(&self) -> Option<&str> {
        self.active_note_id.as_deref()
    }

    /// Collections to hand to persistence
    pub fn data(&self) -> AppData {
        AppData {
            folders: self.folders.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot {
            folders: self.folders.clone(),
            notes: self.notes.clone(),
            active_note_id: self.active_note_id.clone(),
        }
    }

    /// Get a note by ID
    pub fn get_note(&self, id: &str) -> Result<&Note> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
    }

    /// Get a folder by ID
    pub fn get_folder(&self, id: &str) -> Result<&Folder> {
        self.folders
            .iter()
            .find(|f| f.id == id)
            .ok_or_else(|| AppError::FolderNotFound(id.to_string()))
    }

    /// Select a note, or clear the selection with `None`
    pub fn set_active(&mut self, id: Option<&str>) -> Result<()> {
        if let Some(id) = id {
            self.get_note(id)?;
        }
        self.active_note_id = id.map(str::to_string);
        Ok(())
    }

    /// Next free order among notes at `location`
    pub fn next_note_order(&self, location: &Location) -> i64 {
        next_order(
            self.notes
                .iter()
                .filter(|n| &n.folder_id == location)
                .map(|n| n.order),
        )
    }

    /// Next free order among folders under `parent_id`
    pub fn next_folder_order(&self, parent_id: Option<&str>) -> i64 {
        next_order(
            self.folders
                .iter()
                .filter(|f| f.parent_id.as_deref() == parent_id)
                .map(|f| f.order),
        )
    }

    /// Create an empty note at the end of `folder_id` (root when `None`)
    /// and make it the active note.
    pub fn create_note(&mut self, folder_id: Option<&str>) -> Result<Note> {
        self.require_parent(folder_id)?;

        let location = Location::from_parent(folder_id);
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            order: self.next_note_order(&location),
            folder_id: location,
            previous_folder_id: None,
            created_at: now,
            updated_at: now,
        };

        self.notes.push(note.clone());
        self.active_note_id = Some(note.id.clone());

        tracing::debug!("Created note: {}", note.id);
        Ok(note)
    }

    /// Merge the present fields of `req` into a note
    pub fn update_note(&mut self, id: &str, req: UpdateNoteRequest) -> Result<Note> {
        let note = self.note_mut(id)?;

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(content) = req.content {
            note.content = content;
        }
        if let Some(order) = req.order {
            note.order = order;
        }
        note.updated_at = Utc::now();

        tracing::debug!("Updated note: {}", id);
        Ok(note.clone())
    }

    /// Two-phase delete: a live note goes to the trash, a trashed note is
    /// removed for good.
    pub fn delete_note(&mut self, id: &str) -> Result<DeleteOutcome> {
        let index = self.note_index(id)?;
        let was_active = self.active_note_id.as_deref() == Some(id);

        if self.notes[index].is_trashed() {
            self.notes.remove(index);
            if was_active {
                self.active_note_id = self.fallback_after_purge();
            }
            tracing::debug!("Permanently deleted note: {}", id);
            return Ok(DeleteOutcome::Purged);
        }

        let note = &mut self.notes[index];
        note.previous_folder_id = note.folder_id.folder_id().map(str::to_string);
        note.folder_id = Location::Trash;
        note.updated_at = Utc::now();

        if was_active {
            self.active_note_id = self
                .notes
                .iter()
                .find(|n| !n.is_trashed())
                .map(|n| n.id.clone());
        }

        tracing::debug!("Moved note to trash: {}", id);
        Ok(DeleteOutcome::Trashed)
    }

    /// Bring a trashed note back to the folder it was deleted from, or to
    /// the root when that folder no longer exists. Live notes are left alone.
    pub fn restore_note(&mut self, id: &str) -> Result<Note> {
        let index = self.note_index(id)?;

        if !self.notes[index].is_trashed() {
            tracing::debug!("Note {} is not in the trash, nothing to restore", id);
            return Ok(self.notes[index].clone());
        }

        let target = match self.notes[index].previous_folder_id.as_deref() {
            Some(folder_id) if self.get_folder(folder_id).is_ok() => {
                Location::Folder(folder_id.to_string())
            }
            _ => Location::Root,
        };
        let order = self.next_note_order(&target);

        let note = &mut self.notes[index];
        note.folder_id = target;
        note.previous_folder_id = None;
        note.order = order;
        note.updated_at = Utc::now();

        tracing::debug!("Restored note {} to {:?}", id, note.folder_id);
        Ok(note.clone())
    }

    /// Permanently remove every trashed note. Returns how many were removed.
    pub fn empty_trash(&mut self) -> usize {
        let before = self.notes.len();
        self.notes.retain(|n| !n.is_trashed());
        let removed = before - self.notes.len();

        let active_gone = self
            .active_note_id
            .as_deref()
            .is_some_and(|id| !self.notes.iter().any(|n| n.id == id));
        if active_gone {
            self.active_note_id = self.fallback_after_purge();
        }

        tracing::debug!("Emptied trash: {} notes removed", removed);
        removed
    }

    /// Create a folder at the end of `parent_id` (root when `None`)
    pub fn create_folder(&mut self, parent_id: Option<&str>) -> Result<Folder> {
        self.require_parent(parent_id)?;

        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: DEFAULT_FOLDER_NAME.to_string(),
            parent_id: parent_id.map(str::to_string),
            collapsed: false,
            order: self.next_folder_order(parent_id),
        };

        self.folders.push(folder.clone());

        tracing::debug!("Created folder: {}", folder.id);
        Ok(folder)
    }

    /// Merge the present fields of `req` into a folder
    pub fn update_folder(&mut self, id: &str, req: UpdateFolderRequest) -> Result<Folder> {
        let folder = self.folder_mut(id)?;

        if let Some(name) = req.name {
            folder.name = name;
        }
        if let Some(collapsed) = req.collapsed {
            folder.collapsed = collapsed;
        }
        if let Some(order) = req.order {
            folder.order = order;
        }

        tracing::debug!("Updated folder: {}", id);
        Ok(folder.clone())
    }

    /// Remove a folder immediately. Its direct child folders and notes move
    /// up to the deleted folder's own parent; deeper levels are untouched.
    pub fn delete_folder(&mut self, id: &str) -> Result<()> {
        let index = self.folder_index(id)?;
        let grandparent = self.folders[index].parent_id.clone();

        for folder in self.folders.iter_mut() {
            if folder.parent_id.as_deref() == Some(id) {
                folder.parent_id = grandparent.clone();
            }
        }

        let promoted = Location::from_parent(grandparent.as_deref());
        for note in self.notes.iter_mut() {
            if note.folder_id.folder_id() == Some(id) {
                note.folder_id = promoted.clone();
            }
        }

        self.folders.remove(index);

        tracing::debug!("Deleted folder: {}", id);
        Ok(())
    }

    /// Flip a folder's collapsed flag, returning the new value
    pub fn toggle_collapse(&mut self, id: &str) -> Result<bool> {
        let folder = self.folder_mut(id)?;
        folder.collapsed = !folder.collapsed;
        Ok(folder.collapsed)
    }

    /// Move a note to the end of `target` (root when `None`). A trashed
    /// note dropped into the tree leaves the trash.
    pub fn move_note(&mut self, id: &str, target: Option<&str>) -> Result<Note> {
        let index = self.note_index(id)?;
        self.require_parent(target)?;

        let location = Location::from_parent(target);
        let order = self.next_note_order(&location);

        let note = &mut self.notes[index];
        note.folder_id = location;
        note.previous_folder_id = None;
        note.order = order;
        note.updated_at = Utc::now();

        tracing::debug!("Moved note {} to {:?}", id, target);
        Ok(note.clone())
    }

    /// Reparent a folder under `target` (root when `None`).
    ///
    /// Returns `Ok(false)` and changes nothing when the move would make the
    /// folder its own ancestor.
    pub fn move_folder(&mut self, id: &str, target: Option<&str>) -> Result<bool> {
        let index = self.folder_index(id)?;
        self.require_parent(target)?;

        if self.would_create_cycle(id, target) {
            tracing::debug!("Declined moving folder {} under {:?}: cycle", id, target);
            return Ok(false);
        }

        let order = self.next_folder_order(target);
        let folder = &mut self.folders[index];
        folder.parent_id = target.map(str::to_string);
        folder.order = order;

        tracing::debug!("Moved folder {} under {:?}", id, target);
        Ok(true)
    }

    /// Whether placing `id` under `target` would close a loop. Walks the
    /// ancestor chain of `target` up to the root looking for `id`.
    pub fn would_create_cycle(&self, id: &str, target: Option<&str>) -> bool {
        let mut current = target;
        let mut steps = 0;

        while let Some(folder_id) = current {
            if folder_id == id {
                return true;
            }
            steps += 1;
            if steps > self.folders.len() {
                return true;
            }
            current = self
                .folders
                .iter()
                .find(|f| f.id == folder_id)
                .and_then(|f| f.parent_id.as_deref());
        }

        false
    }

    /// Direct children of `parent_id`, each kind sorted by `order`
    pub fn list_children(&self, parent_id: Option<&str>) -> FolderContents {
        let mut folders: Vec<Folder> = self
            .folders
            .iter()
            .filter(|f| f.parent_id.as_deref() == parent_id)
            .cloned()
            .collect();
        folders.sort_by_key(|f| f.order);

        let location = Location::from_parent(parent_id);
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.folder_id == location)
            .cloned()
            .collect();
        notes.sort_by_key(|n| n.order);

        FolderContents { folders, notes }
    }

    /// Trashed notes in collection order
    pub fn list_trash(&self) -> Vec<Note> {
        self.notes.iter().filter(|n| n.is_trashed()).cloned().collect()
    }

    fn require_parent(&self, parent_id: Option<&str>) -> Result<()> {
        if let Some(id) = parent_id {
            self.get_folder(id)?;
        }
        Ok(())
    }

    /// Selection after a permanent delete: another trashed note, else the
    /// first note, else nothing.
    fn fallback_after_purge(&self) -> Option<String> {
        self.notes
            .iter()
            .find(|n| n.is_trashed())
            .or_else(|| self.notes.first())
            .map(|n| n.id.clone())
    }

    fn note_index(&self, id: &str) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| AppError::NoteNotFound(id.to_string()))
    }

    fn folder_index(&self, id: &str) -> Result<usize> {
        self.folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AppError::FolderNotFound(id.to_string()))
    }

    fn note_mut(&mut self, id: &str) -> Result<&mut Note> {
        let index = self.note_index(id)?;
        Ok(&mut self.notes[index])
    }

    fn folder_mut(&mut self, id: &str) -> Result<&mut Folder> {
        let index = self.folder_index(id)?;
        Ok(&mut self.folders[index])
    }
}

/// Move to the root every folder that turns out to be its own ancestor
fn break_parent_cycles(folders: &mut [Folder]) {
    let mut parents: HashMap<String, Option<String>> = folders
        .iter()
        .map(|f| (f.id.clone(), f.parent_id.clone()))
        .collect();

    for folder in folders.iter_mut() {
        let mut visited = HashSet::new();
        let mut current = parents.get(&folder.id).cloned().flatten();

        while let Some(ancestor) = current {
            if ancestor == folder.id {
                tracing::warn!("Folder {} is its own ancestor, moving to root", folder.id);
                folder.parent_id = None;
                parents.insert(folder.id.clone(), None);
                break;
            }
            if !visited.insert(ancestor.clone()) {
                break;
            }
            current = parents.get(&ancestor).cloned().flatten();
        }
    }
}
