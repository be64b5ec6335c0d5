//! Application state and initialization
//!
//! Wires the JSON store, settings, the notes service and the reader driver
//! together. Everything a front end needs is reachable through `AppState`.

use crate::error::Result;
use crate::reader::ReaderDriver;
use crate::services::{AutosaveService, NotesService, ReaderSettings, SettingsService};
use crate::storage::JsonFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub data_dir: PathBuf,
    pub settings_service: SettingsService<JsonFileStore>,
    pub notes_service: NotesService<JsonFileStore>,
    pub autosave: AutosaveService<JsonFileStore>,
    pub reader: ReaderDriver,
}

impl AppState {
    /// Store new settings and push them to autosave and the reader
    pub async fn apply_settings(&self, settings: &ReaderSettings) -> Result<()> {
        self.settings_service.save(settings).await?;
        self.autosave.set_delay(settings.auto_save_delay).await;
        self.reader.configure(settings.pacing()).await;
        Ok(())
    }

    /// Open a note in the reader; `false` when it has nothing to read
    pub async fn open_in_reader(&self, note_id: &str) -> bool {
        let Some(tokens) = self.notes_service.reading_tokens(note_id).await else {
            tracing::warn!("Cannot read unknown note: {}", note_id);
            return false;
        };
        let opened = self.reader.open(tokens).await;
        if !opened {
            tracing::info!("Note {} has no words to read", note_id);
        }
        opened
    }

    /// Flush pending changes before exit
    pub async fn shutdown(&self) -> Result<()> {
        self.reader.close().await;
        self.notes_service.flush().await
    }
}

/// Application setup - called once on startup
pub async fn setup(data_dir: &Path) -> Result<AppState> {
    tracing::info!("Initializing application");
    tracing::info!("App data directory: {:?}", data_dir);

    let store = Arc::new(JsonFileStore::new(data_dir.to_path_buf()));
    store.initialize().await?;

    let settings_service = SettingsService::new(Arc::clone(&store));
    let settings = settings_service.load().await;

    let autosave = AutosaveService::new(Arc::clone(&store), settings.auto_save_delay);
    let notes_service = NotesService::load(store.as_ref(), autosave.clone()).await;
    let reader = ReaderDriver::new(settings.pacing());

    tracing::info!("Application initialized successfully");

    Ok(AppState {
        data_dir: data_dir.to_path_buf(),
        settings_service,
        notes_service,
        autosave,
        reader,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::PlaybackState;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_setup_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("data");

        let state = setup(&data_dir).await.unwrap();

        assert!(data_dir.is_dir());
        assert!(state.notes_service.snapshot().await.notes.is_empty());
        assert_eq!(state.reader.frame().effective_wpm, 300);
    }

    #[tokio::test]
    async fn test_apply_settings_reaches_reader() {
        let temp_dir = TempDir::new().unwrap();
        let state = setup(temp_dir.path()).await.unwrap();

        let settings = ReaderSettings {
            wpm: 600,
            ..ReaderSettings::default()
        };
        state.apply_settings(&settings).await.unwrap();

        assert_eq!(state.reader.frame().effective_wpm, 600);
        assert_eq!(state.settings_service.load().await.wpm, 600);
    }

    #[tokio::test]
    async fn test_empty_note_does_not_open() {
        let temp_dir = TempDir::new().unwrap();
        let state = setup(temp_dir.path()).await.unwrap();
        let note = state.notes_service.create_note(None).await.unwrap();

        assert!(!state.open_in_reader(&note.id).await);
        assert!(!state.open_in_reader("missing").await);
        assert_eq!(state.reader.frame().state, PlaybackState::Idle);
    }
}
