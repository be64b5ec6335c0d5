//! Notes service
//!
//! Coordinates the folder/note tree with autosave. Mutations run against
//! the in-memory tree, schedule a debounced save of the result and hand
//! back the new snapshot. Unknown ids are logged and ignored.

use super::autosave::AutosaveService;
use super::plain_text::{DeltaPlainText, PlainTextExtractor};
use crate::error::Result;
use crate::reader::segment;
use crate::storage::Persistence;
use crate::tree::{
    Folder, FolderContents, Note, TreeSnapshot, TreeStore, UpdateFolderRequest, UpdateNoteRequest,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Service for managing notes and folders
pub struct NotesService<P> {
    tree: Arc<Mutex<TreeStore>>,
    autosave: AutosaveService<P>,
    extractor: Arc<dyn PlainTextExtractor>,
}

impl<P> Clone for NotesService<P> {
    fn clone(&self) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            autosave: self.autosave.clone(),
            extractor: Arc::clone(&self.extractor),
        }
    }
}

impl<P: Persistence> NotesService<P> {
    pub fn new(tree: TreeStore, autosave: AutosaveService<P>) -> Self {
        Self {
            tree: Arc::new(Mutex::new(tree)),
            autosave,
            extractor: Arc::new(DeltaPlainText),
        }
    }

    /// Build the service from persisted data; a failed load starts empty
    pub async fn load(persistence: &P, autosave: AutosaveService<P>) -> Self {
        let tree = match persistence.load_data().await {
            Ok(data) => TreeStore::from_data(data),
            Err(e) => {
                tracing::warn!("Failed to load notes, starting empty: {}", e);
                TreeStore::new()
            }
        };
        Self::new(tree, autosave)
    }

    /// Replace the content-to-text extractor used for reading
    pub fn with_extractor(mut self, extractor: impl PlainTextExtractor + 'static) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub async fn snapshot(&self) -> TreeSnapshot {
        self.tree.lock().await.snapshot()
    }

    pub async fn get_note(&self, id: &str) -> Option<Note> {
        let tree = self.tree.lock().await;
        tree.get_note(id).ok().cloned()
    }

    /// Folders then notes directly under `parent_id`, each sorted by order
    pub async fn list_children(&self, parent_id: Option<&str>) -> FolderContents {
        self.tree.lock().await.list_children(parent_id)
    }

    pub async fn list_trash(&self) -> Vec<Note> {
        self.tree.lock().await.list_trash()
    }

    /// Change the selection; not persisted
    pub async fn set_active(&self, id: Option<&str>) -> TreeSnapshot {
        let mut tree = self.tree.lock().await;
        if let Err(e) = tree.set_active(id) {
            tracing::warn!("Ignoring selection of unknown note: {}", e);
        }
        tree.snapshot()
    }

    /// Create a note and select it; `None` when the folder is unknown
    pub async fn create_note(&self, folder_id: Option<&str>) -> Option<Note> {
        let note = self.mutate("create note", |t| t.create_note(folder_id)).await?;
        tracing::info!("Note created: {}", note.id);
        Some(note)
    }

    pub async fn update_note(&self, id: &str, req: UpdateNoteRequest) -> TreeSnapshot {
        self.apply("update note", |t| t.update_note(id, req)).await
    }

    /// Trash a live note, or purge one already in the trash
    pub async fn delete_note(&self, id: &str) -> TreeSnapshot {
        self.apply("delete note", |t| t.delete_note(id)).await
    }

    pub async fn restore_note(&self, id: &str) -> TreeSnapshot {
        self.apply("restore note", |t| t.restore_note(id)).await
    }

    pub async fn empty_trash(&self) -> TreeSnapshot {
        self.apply("empty trash", |t| Ok(t.empty_trash())).await
    }

    /// Create a folder; `None` when the parent is unknown
    pub async fn create_folder(&self, parent_id: Option<&str>) -> Option<Folder> {
        let folder = self
            .mutate("create folder", |t| t.create_folder(parent_id))
            .await?;
        tracing::info!("Folder created: {}", folder.id);
        Some(folder)
    }

    pub async fn update_folder(&self, id: &str, req: UpdateFolderRequest) -> TreeSnapshot {
        self.apply("update folder", |t| t.update_folder(id, req)).await
    }

    /// Delete a folder, promoting its children to its parent
    pub async fn delete_folder(&self, id: &str) -> TreeSnapshot {
        self.apply("delete folder", |t| t.delete_folder(id)).await
    }

    pub async fn toggle_collapse(&self, id: &str) -> TreeSnapshot {
        self.apply("toggle collapse", |t| t.toggle_collapse(id)).await
    }

    pub async fn move_note(&self, id: &str, target: Option<&str>) -> TreeSnapshot {
        self.apply("move note", |t| t.move_note(id, target)).await
    }

    /// Reparent a folder; moves that would form a cycle are declined
    pub async fn move_folder(&self, id: &str, target: Option<&str>) -> TreeSnapshot {
        self.apply("move folder", |t| t.move_folder(id, target)).await
    }

    /// Plain-text tokens of a note, ready for a reading session
    pub async fn reading_tokens(&self, id: &str) -> Option<Vec<String>> {
        let note = self.get_note(id).await?;
        let text = self.extractor.extract(&note.content);
        Some(segment(&text))
    }

    /// Save the current tree now, dropping any pending autosave
    pub async fn flush(&self) -> Result<()> {
        let data = self.tree.lock().await.data();
        self.autosave.flush(&data).await
    }

    async fn apply<T>(
        &self,
        action: &str,
        op: impl FnOnce(&mut TreeStore) -> Result<T>,
    ) -> TreeSnapshot {
        let mut tree = self.tree.lock().await;
        self.run(&mut tree, action, op).await;
        tree.snapshot()
    }

    async fn mutate<T>(
        &self,
        action: &str,
        op: impl FnOnce(&mut TreeStore) -> Result<T>,
    ) -> Option<T> {
        let mut tree = self.tree.lock().await;
        self.run(&mut tree, action, op).await
    }

    async fn run<T>(
        &self,
        tree: &mut TreeStore,
        action: &str,
        op: impl FnOnce(&mut TreeStore) -> Result<T>,
    ) -> Option<T> {
        match op(tree) {
            Ok(value) => {
                tracing::debug!("Applied {}", action);
                self.autosave.schedule(tree.data()).await;
                Some(value)
            }
            Err(e) if e.is_invalid_reference() => {
                tracing::warn!("Ignoring {}: {}", action, e);
                None
            }
            Err(e) => {
                tracing::error!("Failed to {}: {}", action, e);
                None
            }
        }
    }
}
