//! Reading session state machine
//!
//! The session never sleeps itself. Whenever it should advance later it
//! records an [`Arm`]: a delay plus a generation number. Every change made
//! while playing bumps the generation, so at most one arm is live and a
//! timer holding an older generation is ignored when it fires.

use super::{pacing, training, PacingToggles};
use crate::config::{DEFAULT_TRAINING_INCREMENT, DEFAULT_WPM};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// Reader closed
    Idle,
    /// Open, not advancing
    Ready,
    /// Advancing on a timer
    Playing,
    /// Position reached the end of the tokens
    Finished,
}

/// Speed and adaptation parameters for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    pub wpm: u32,
    pub toggles: PacingToggles,
    pub training_mode: bool,
    pub training_increment: u32,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            wpm: DEFAULT_WPM,
            toggles: PacingToggles::default(),
            training_mode: false,
            training_increment: DEFAULT_TRAINING_INCREMENT,
        }
    }
}

/// A scheduled single advance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arm {
    pub generation: u64,
    pub delay_ms: f64,
}

impl Arm {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.delay_ms.max(0.0) / 1_000.0)
    }
}

#[derive(Debug, Clone)]
pub struct ReaderSession {
    tokens: Vec<String>,
    position: usize,
    state: PlaybackState,
    config: PacingConfig,
    /// Speed the training ramp counts up from
    start_wpm: u32,
    generation: u64,
    pending: Option<Arm>,
}

impl ReaderSession {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            tokens: Vec::new(),
            position: 0,
            state: PlaybackState::Idle,
            start_wpm: config.wpm,
            config,
            generation: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    /// The advance currently waiting to fire, if any
    pub fn pending(&self) -> Option<Arm> {
        self.pending
    }

    /// Token under the cursor; `None` when closed or past the end
    pub fn current_token(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// Speed in force at the current position
    pub fn effective_wpm(&self) -> u32 {
        if self.config.training_mode {
            training::effective_wpm(self.position, self.start_wpm, self.config.training_increment)
        } else {
            self.config.wpm
        }
    }

    /// Display time of the current token under the current parameters
    pub fn current_delay_ms(&self) -> Option<f64> {
        let token = self.current_token()?;
        let wpm = self.effective_wpm().max(1);
        Some(pacing::delay(token, f64::from(wpm), self.config.toggles))
    }

    /// Start a fresh session over `tokens`. Refuses an empty sequence and
    /// leaves the session untouched in that case.
    pub fn open(&mut self, tokens: Vec<String>) -> bool {
        if tokens.is_empty() {
            tracing::debug!("Refusing to open reader without tokens");
            return false;
        }

        self.cancel();
        self.tokens = tokens;
        self.position = 0;
        self.start_wpm = self.config.wpm;
        self.state = PlaybackState::Ready;

        tracing::debug!("Reader opened with {} tokens", self.tokens.len());
        true
    }

    /// Play or pause. Playing from `Finished` starts over.
    pub fn toggle_play(&mut self) -> Option<Arm> {
        match self.state {
            PlaybackState::Idle => None,
            PlaybackState::Playing => {
                self.cancel();
                self.state = PlaybackState::Ready;
                None
            }
            PlaybackState::Finished => {
                self.position = 0;
                self.state = PlaybackState::Playing;
                self.rearm()
            }
            PlaybackState::Ready => {
                self.state = PlaybackState::Playing;
                self.rearm()
            }
        }
    }

    /// Close the reader and drop the session
    pub fn close(&mut self) {
        self.cancel();
        self.tokens.clear();
        self.position = 0;
        self.state = PlaybackState::Idle;
        tracing::debug!("Reader closed");
    }

    /// Jump to `index`, clamped to the last token. Play/pause is unchanged;
    /// a finished session becomes ready since the cursor is back in range.
    pub fn seek(&mut self, index: usize) -> Option<Arm> {
        if !self.is_open() {
            return None;
        }

        self.position = index.min(self.tokens.len() - 1);
        if self.state == PlaybackState::Finished {
            self.state = PlaybackState::Ready;
        }
        self.rearm()
    }

    /// Right arrow
    pub fn step_forward(&mut self) -> Option<Arm> {
        self.seek(self.position.saturating_add(1))
    }

    /// Left arrow
    pub fn step_back(&mut self) -> Option<Arm> {
        let target = self.position.min(self.tokens.len()).saturating_sub(1);
        self.seek(target)
    }

    /// Change the base speed. The training ramp restarts from it.
    pub fn set_wpm(&mut self, wpm: u32) -> Option<Arm> {
        self.config.wpm = wpm;
        self.start_wpm = wpm;
        self.rearm()
    }

    pub fn set_toggles(&mut self, toggles: PacingToggles) -> Option<Arm> {
        self.config.toggles = toggles;
        self.rearm()
    }

    pub fn set_training(&mut self, enabled: bool, increment: u32) -> Option<Arm> {
        self.config.training_mode = enabled;
        self.config.training_increment = increment;
        self.rearm()
    }

    /// Timer callback. Advances one token if `generation` is the live arm;
    /// stale generations are ignored. Returns the next arm, if any.
    pub fn fire(&mut self, generation: u64) -> Option<Arm> {
        match self.pending {
            Some(arm) if arm.generation == generation => {}
            _ => {
                tracing::debug!("Ignoring stale reader timer {}", generation);
                return None;
            }
        }

        self.pending = None;
        self.position += 1;
        if self.position >= self.tokens.len() {
            self.state = PlaybackState::Finished;
            tracing::debug!("Reader finished after {} tokens", self.tokens.len());
            return None;
        }

        self.rearm()
    }

    fn cancel(&mut self) {
        self.pending = None;
        self.generation += 1;
    }

    /// Drop any pending arm and, while playing, schedule the current token
    /// afresh. A cursor already past the end finishes the session instead.
    fn rearm(&mut self) -> Option<Arm> {
        self.cancel();

        if self.state != PlaybackState::Playing {
            return None;
        }

        let Some(delay_ms) = self.current_delay_ms() else {
            self.state = PlaybackState::Finished;
            return None;
        };

        let arm = Arm {
            generation: self.generation,
            delay_ms,
        };
        self.pending = Some(arm);
        Some(arm)
    }
}

impl Default for ReaderSession {
    fn default() -> Self {
        Self::new(PacingConfig::default())
    }
}
