//! Error types for rsvpnotes
//!
//! All errors use thiserror for structured error handling.
//! The service layer decides which of these are surfaced and which
//! degrade to a logged no-op.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl AppError {
    /// True for errors caused by an id that does not resolve to a note or folder.
    pub fn is_invalid_reference(&self) -> bool {
        matches!(self, AppError::NoteNotFound(_) | AppError::FolderNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
