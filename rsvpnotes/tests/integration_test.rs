//! Integration tests for RsvpNotes
//!
//! These tests verify end-to-end functionality including:
//! - Tree changes surviving a restart through the JSON store
//! - Trash and restore across folder deletion
//! - Reading a stored note through the reader driver

use rsvpnotes::app;
use rsvpnotes::reader::{PacingConfig, PlaybackState, ReaderDriver};
use rsvpnotes::services::{delta_from_text, ReaderSettings};
use rsvpnotes::tree::{Location, UpdateNoteRequest};
use std::time::Duration;
use tempfile::TempDir;

fn content(text: &str) -> UpdateNoteRequest {
    UpdateNoteRequest {
        content: Some(delta_from_text(text)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_tree_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let (folder_id, note_id) = {
        let state = app::setup(temp_dir.path()).await.unwrap();
        let notes = &state.notes_service;

        let folder = notes.create_folder(None).await.unwrap();
        let child = notes.create_folder(Some(&folder.id)).await.unwrap();
        let note = notes.create_note(Some(&child.id)).await.unwrap();
        notes.update_note(&note.id, content("Persist me")).await;

        state.shutdown().await.unwrap();
        (folder.id, note.id)
    };

    let state = app::setup(temp_dir.path()).await.unwrap();
    let snapshot = state.notes_service.snapshot().await;

    assert_eq!(snapshot.folders.len(), 2);
    assert_eq!(snapshot.active_note_id.as_deref(), Some(note_id.as_str()));
    assert_eq!(
        state.notes_service.list_children(Some(&folder_id)).await.folders.len(),
        1
    );
    assert_eq!(
        state.notes_service.reading_tokens(&note_id).await.unwrap(),
        vec!["Persist", "me"]
    );
}

#[tokio::test]
async fn test_restore_after_folder_deleted_goes_to_root() {
    let temp_dir = TempDir::new().unwrap();
    let state = app::setup(temp_dir.path()).await.unwrap();
    let notes = &state.notes_service;

    let folder = notes.create_folder(None).await.unwrap();
    let note = notes.create_note(Some(&folder.id)).await.unwrap();

    let snapshot = notes.delete_note(&note.id).await;
    let trashed = snapshot.notes.iter().find(|n| n.id == note.id).unwrap();
    assert_eq!(trashed.folder_id, Location::Trash);
    assert_eq!(trashed.previous_folder_id.as_deref(), Some(folder.id.as_str()));

    notes.delete_folder(&folder.id).await;
    state.shutdown().await.unwrap();

    // Reload to make sure the trashed state round-trips through disk
    let state = app::setup(temp_dir.path()).await.unwrap();
    let snapshot = state.notes_service.restore_note(&note.id).await;
    let restored = snapshot.notes.iter().find(|n| n.id == note.id).unwrap();

    assert_eq!(restored.folder_id, Location::Root);
    assert_eq!(restored.previous_folder_id, None);
}

#[tokio::test]
async fn test_empty_trash_is_permanent() {
    let temp_dir = TempDir::new().unwrap();
    let state = app::setup(temp_dir.path()).await.unwrap();
    let notes = &state.notes_service;

    let keep = notes.create_note(None).await.unwrap();
    let gone = notes.create_note(None).await.unwrap();
    notes.delete_note(&gone.id).await;

    let snapshot = notes.empty_trash().await;
    state.shutdown().await.unwrap();

    assert_eq!(snapshot.notes.len(), 1);
    assert_eq!(snapshot.notes[0].id, keep.id);

    let state = app::setup(temp_dir.path()).await.unwrap();
    assert!(state.notes_service.get_note(&gone.id).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_read_stored_note_to_the_end() {
    let temp_dir = TempDir::new().unwrap();
    let state = app::setup(temp_dir.path()).await.unwrap();
    let note = state.notes_service.create_note(None).await.unwrap();
    state
        .notes_service
        .update_note(&note.id, content("One two three. Four five, six."))
        .await;

    assert!(state.open_in_reader(&note.id).await);
    assert_eq!(state.reader.frame().total, 6);

    state.reader.toggle_play().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let frame = state.reader.frame();
    assert_eq!(frame.state, PlaybackState::Finished);
    assert_eq!(frame.position, 6);
}

#[tokio::test]
async fn test_training_ramp_through_driver() {
    let driver = ReaderDriver::new(PacingConfig {
        training_mode: true,
        ..PacingConfig::default()
    });
    let tokens: Vec<String> = (0..200).map(|i| format!("word{}", i)).collect();
    driver.open(tokens).await;

    driver.seek(149).await;
    assert_eq!(driver.frame().effective_wpm, 320);

    driver.seek(150).await;
    assert_eq!(driver.frame().effective_wpm, 330);

    driver.step_back().await;
    assert_eq!(driver.frame().effective_wpm, 320);
}

#[tokio::test]
async fn test_settings_drive_new_sessions() {
    let temp_dir = TempDir::new().unwrap();
    {
        let state = app::setup(temp_dir.path()).await.unwrap();
        let settings = ReaderSettings {
            wpm: 500,
            ..ReaderSettings::default()
        };
        state.apply_settings(&settings).await.unwrap();
    }

    let state = app::setup(temp_dir.path()).await.unwrap();
    assert_eq!(state.reader.frame().effective_wpm, 500);
}
