//! RSVP reader
//!
//! Turns note text into a word-at-a-time reading session:
//! - `segmenter`: text to display tokens
//! - `pacing`: per-token display time with adaptation rules
//! - `training`: the training mode speed ramp
//! - `focus`: fixation character split for renderers
//! - `playback`: the session state machine
//! - `driver`: tokio timer and frame publishing around a session

pub mod driver;
pub mod focus;
pub mod pacing;
pub mod playback;
pub mod segmenter;
pub mod training;

pub use driver::{ReaderDriver, ReaderFrame};
pub use focus::{focus_index, FocusSplit};
pub use pacing::{delay, PacingToggles};
pub use playback::{Arm, PacingConfig, PlaybackState, ReaderSession};
pub use segmenter::segment;
pub use training::effective_wpm;
