//! Services module
//!
//! Coordination between the tree, the reader and persistence.

pub mod autosave;
pub mod notes;
pub mod plain_text;
pub mod settings;

pub use autosave::AutosaveService;
pub use notes::NotesService;
pub use plain_text::{delta_from_text, DeltaPlainText, PlainTextExtractor};
pub use settings::{ReaderSettings, SettingsService};
