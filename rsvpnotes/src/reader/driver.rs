//! Async driver for a reading session
//!
//! Owns the session and at most one tokio timer task. After every
//! operation the timer is aborted and re-spawned if the session armed a
//! new advance, and a fresh [`ReaderFrame`] is published for renderers.

use super::focus::FocusSplit;
use super::playback::{Arm, PacingConfig, PlaybackState, ReaderSession};
use super::PacingToggles;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// What a renderer needs to draw the reader
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderFrame {
    pub state: PlaybackState,
    pub position: usize,
    pub total: usize,
    pub token: Option<String>,
    pub split: Option<FocusSplit>,
    pub effective_wpm: u32,
}

impl ReaderFrame {
    fn capture(session: &ReaderSession) -> Self {
        let token = session.current_token().map(str::to_string);
        Self {
            state: session.state(),
            position: session.position(),
            total: session.len(),
            split: token.as_deref().map(FocusSplit::new),
            token,
            effective_wpm: session.effective_wpm(),
        }
    }
}

struct Shared {
    session: ReaderSession,
    /// Generation and task of the running timer
    timer: Option<(u64, JoinHandle<()>)>,
}

struct Inner {
    shared: Mutex<Shared>,
    frames: watch::Sender<ReaderFrame>,
}

impl Inner {
    /// Make the timer task match the session's pending arm
    fn sync_timer(self: &Arc<Self>, shared: &mut Shared) {
        let pending = shared.session.pending();
        let running = shared.timer.as_ref().map(|(generation, _)| *generation);

        if pending.map(|arm| arm.generation) == running {
            return;
        }

        if let Some((_, handle)) = shared.timer.take() {
            handle.abort();
        }
        if let Some(arm) = pending {
            shared.timer = Some((arm.generation, spawn_timer(Arc::downgrade(self), arm)));
        }
    }

    fn publish(&self, session: &ReaderSession) {
        self.frames.send_replace(ReaderFrame::capture(session));
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.shared.get_mut().timer.take() {
            handle.abort();
        }
    }
}

/// The task holds only a weak handle; the session ends with its last driver
fn spawn_timer(inner: Weak<Inner>, arm: Arm) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(arm.duration()).await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut shared = inner.shared.lock().await;
        if shared.timer.as_ref().map(|(generation, _)| *generation) == Some(arm.generation) {
            // This task is the running timer; let go of its own handle
            shared.timer = None;
        }
        shared.session.fire(arm.generation);
        inner.sync_timer(&mut shared);
        inner.publish(&shared.session);
    })
}

/// Cloneable handle to one reading session
#[derive(Clone)]
pub struct ReaderDriver {
    inner: Arc<Inner>,
}

impl ReaderDriver {
    pub fn new(config: PacingConfig) -> Self {
        let session = ReaderSession::new(config);
        let (frames, _) = watch::channel(ReaderFrame::capture(&session));

        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    session,
                    timer: None,
                }),
                frames,
            }),
        }
    }

    /// Receive a frame after every change
    pub fn subscribe(&self) -> watch::Receiver<ReaderFrame> {
        self.inner.frames.subscribe()
    }

    /// Latest published frame
    pub fn frame(&self) -> ReaderFrame {
        self.inner.frames.borrow().clone()
    }

    pub async fn open(&self, tokens: Vec<String>) -> bool {
        self.apply(|s| s.open(tokens)).await
    }

    pub async fn toggle_play(&self) {
        self.apply(|s| s.toggle_play()).await;
    }

    pub async fn close(&self) {
        self.apply(|s| s.close()).await;
    }

    pub async fn seek(&self, index: usize) {
        self.apply(|s| s.seek(index)).await;
    }

    pub async fn step_forward(&self) {
        self.apply(|s| s.step_forward()).await;
    }

    pub async fn step_back(&self) {
        self.apply(|s| s.step_back()).await;
    }

    pub async fn set_wpm(&self, wpm: u32) {
        self.apply(|s| s.set_wpm(wpm)).await;
    }

    pub async fn set_toggles(&self, toggles: PacingToggles) {
        self.apply(|s| s.set_toggles(toggles)).await;
    }

    pub async fn set_training(&self, enabled: bool, increment: u32) {
        self.apply(|s| s.set_training(enabled, increment)).await;
    }

    /// Apply every pacing parameter at once
    pub async fn configure(&self, config: PacingConfig) {
        self.apply(|s| {
            s.set_toggles(config.toggles);
            s.set_training(config.training_mode, config.training_increment);
            s.set_wpm(config.wpm)
        })
        .await;
    }

    async fn apply<T>(&self, op: impl FnOnce(&mut ReaderSession) -> T) -> T {
        let mut shared = self.inner.shared.lock().await;
        let result = op(&mut shared.session);
        self.inner.sync_timer(&mut shared);
        self.inner.publish(&shared.session);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{}", i)).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_through_to_finished() {
        let driver = ReaderDriver::new(PacingConfig::default());
        assert!(driver.open(words(5)).await);

        driver.toggle_play().await;
        // 5 tokens at 300 WPM is one second of reading
        tokio::time::sleep(Duration::from_secs(2)).await;

        let frame = driver.frame();
        assert_eq!(frame.state, PlaybackState::Finished);
        assert_eq!(frame.position, 5);
        assert_eq!(frame.token, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_advancing() {
        let driver = ReaderDriver::new(PacingConfig::default());
        driver.open(words(5)).await;

        driver.toggle_play().await;
        tokio::time::sleep(Duration::from_millis(450)).await;
        driver.toggle_play().await;
        let paused_at = driver.frame().position;

        tokio::time::sleep(Duration::from_secs(5)).await;

        let frame = driver.frame();
        assert_eq!(paused_at, 2);
        assert_eq!(frame.position, 2);
        assert_eq!(frame.state, PlaybackState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_speed_change_rearms_from_scratch() {
        let driver = ReaderDriver::new(PacingConfig::default());
        driver.open(words(3)).await;

        driver.toggle_play().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        // 100 WPM: the current word now needs a full 600ms from here
        driver.set_wpm(100).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(driver.frame().position, 0);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(driver.frame().position, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_timer() {
        let driver = ReaderDriver::new(PacingConfig::default());
        driver.open(words(3)).await;
        driver.toggle_play().await;

        driver.close().await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        let frame = driver.frame();
        assert_eq!(frame.state, PlaybackState::Idle);
        assert_eq!(frame.position, 0);
        assert_eq!(frame.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_last_driver_stops_timer() {
        let driver = ReaderDriver::new(PacingConfig::default());
        driver.open(words(5)).await;
        driver.toggle_play().await;
        let mut frames = driver.subscribe();

        drop(driver);
        tokio::time::sleep(Duration::from_secs(5)).await;

        // The sender went away with the session instead of publishing more frames
        assert!(frames.changed().await.is_err());
        assert_eq!(frames.borrow().position, 0);
        assert_eq!(frames.borrow().state, PlaybackState::Playing);
    }

    #[tokio::test]
    async fn test_frame_carries_focus_split() {
        let driver = ReaderDriver::new(PacingConfig::default());
        let mut frames = driver.subscribe();

        driver.open(vec!["reading".to_string()]).await;
        frames.changed().await.unwrap();

        let frame = frames.borrow().clone();
        assert_eq!(frame.state, PlaybackState::Ready);
        assert_eq!(frame.split, Some(FocusSplit::new("reading")));
        assert_eq!(frame.effective_wpm, 300);
    }

    #[tokio::test]
    async fn test_open_empty_is_refused() {
        let driver = ReaderDriver::new(PacingConfig::default());

        assert!(!driver.open(Vec::new()).await);
        assert_eq!(driver.frame().state, PlaybackState::Idle);
    }
}
