//! Application configuration constants
//!
//! Central location for all configuration constants, pacing parameters,
//! and validation boundaries used throughout the application.

// ===== Tree Defaults =====

/// Title given to freshly created notes
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Name given to freshly created folders
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

/// On-disk value of `folderId` for notes sitting in the trash
pub const TRASH_SENTINEL: &str = "TRASH";

// ===== Pacing =====

/// Words longer than this many word characters get extra display time
pub const LONG_WORD_THRESHOLD: usize = 5;

/// Extra milliseconds per word character beyond the threshold
pub const LONG_WORD_PENALTY_MS: f64 = 12.0;

/// Pause after `.`, `!` or `?`
pub const SENTENCE_PAUSE_MS: f64 = 150.0;

/// Pause after `,`, `;` or `:`
pub const CLAUSE_PAUSE_MS: f64 = 80.0;

/// Pause after a hyphen or em-dash
pub const DASH_PAUSE_MS: f64 = 50.0;

/// Multiplier applied to words outside the common-word list
pub const COMPLEXITY_MULTIPLIER: f64 = 1.2;

// ===== Training Mode =====

/// Tokens read between two training speed-ups
pub const TRAINING_STEP_TOKENS: usize = 50;

/// Ceiling on the effective speed while training.
/// Only the training ramp applies it; the pacing engine is unbounded.
pub const TRAINING_MAX_WPM: u32 = 800;

// ===== Reader Settings Limits =====

/// Slowest speed the settings accept
pub const MIN_WPM: u32 = 100;

/// Fastest speed the settings accept (matches the speed slider)
pub const MAX_WPM: u32 = 800;

/// Speed used when no settings have been saved yet
pub const DEFAULT_WPM: u32 = 300;

/// Default WPM added per training step
pub const DEFAULT_TRAINING_INCREMENT: u32 = 10;

/// Smallest training increment the settings accept
pub const MIN_TRAINING_INCREMENT: u32 = 1;

/// Largest training increment the settings accept
pub const MAX_TRAINING_INCREMENT: u32 = 100;

// ===== Autosave Limits =====

/// Minimum autosave debounce in milliseconds.
/// Values below this cause excessive disk I/O.
pub const MIN_AUTO_SAVE_DELAY_MS: u32 = 100;

/// Maximum autosave debounce in milliseconds (5 minutes).
/// Values above this risk data loss on unexpected shutdown.
pub const MAX_AUTO_SAVE_DELAY_MS: u32 = 300_000;

/// Default autosave debounce (1 second)
pub const DEFAULT_AUTO_SAVE_DELAY_MS: u32 = 1_000;

// ===== Storage =====

/// File holding folders and notes inside the data directory
pub const DATA_FILE_NAME: &str = "data.json";

/// File holding reader settings inside the data directory
pub const SETTINGS_FILE_NAME: &str = "settings.json";
