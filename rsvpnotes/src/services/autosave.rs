//! Debounced autosave
//!
//! Every change schedules a save after the configured delay. A newer
//! schedule cancels the older one so bursts of edits produce one write.
//! Failed saves are logged and not retried; the next change schedules
//! another attempt.

use crate::error::Result;
use crate::storage::Persistence;
use crate::tree::AppData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

struct State {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

/// Autosave scheduler over a persistence backend
pub struct AutosaveService<P> {
    persistence: Arc<P>,
    state: Arc<Mutex<State>>,
}

impl<P> Clone for AutosaveService<P> {
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P: Persistence> AutosaveService<P> {
    pub fn new(persistence: Arc<P>, delay_ms: u32) -> Self {
        Self {
            persistence,
            state: Arc::new(Mutex::new(State {
                delay: Duration::from_millis(u64::from(delay_ms)),
                pending: None,
            })),
        }
    }

    /// Change the debounce delay; applies to the next schedule
    pub async fn set_delay(&self, delay_ms: u32) {
        let mut state = self.state.lock().await;
        state.delay = Duration::from_millis(u64::from(delay_ms));
        tracing::debug!("Autosave delay set to {}ms", delay_ms);
    }

    /// Save `data` after the delay unless another schedule replaces it
    pub async fn schedule(&self, data: AppData) {
        let mut state = self.state.lock().await;
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }

        let delay = state.delay;
        let persistence = Arc::clone(&self.persistence);
        state.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            match persistence.save_data(&data).await {
                Ok(()) => tracing::debug!(
                    "Autosaved {} folders, {} notes",
                    data.folders.len(),
                    data.notes.len()
                ),
                Err(e) => tracing::error!("Autosave failed: {}", e),
            }
        }));
    }

    /// Cancel any pending save and write `data` now
    pub async fn flush(&self, data: &AppData) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            if let Some(handle) = state.pending.take() {
                handle.abort();
            }
        }

        self.persistence.save_data(data).await?;
        tracing::info!("Saved {} folders, {} notes", data.folders.len(), data.notes.len());
        Ok(())
    }

    /// Whether a scheduled save has not run yet
    pub async fn is_pending(&self) -> bool {
        let state = self.state.lock().await;
        state
            .pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStore;
    use crate::tree::TreeStore;
    use tempfile::TempDir;

    fn create_test_service(
        delay_ms: u32,
    ) -> (AutosaveService<JsonFileStore>, Arc<JsonFileStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(temp_dir.path().to_path_buf()));
        (AutosaveService::new(Arc::clone(&store), delay_ms), store, temp_dir)
    }

    fn data_with_notes(n: usize) -> AppData {
        let mut tree = TreeStore::new();
        for _ in 0..n {
            tree.create_note(None).unwrap();
        }
        tree.data()
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_waits_for_delay() {
        let (autosave, store, _temp) = create_test_service(1_000);

        autosave.schedule(data_with_notes(1)).await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(store.load_data().await.unwrap().notes.is_empty());
        assert!(autosave.is_pending().await);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.load_data().await.unwrap().notes.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_schedule_replaces_older() {
        let (autosave, store, _temp) = create_test_service(1_000);

        autosave.schedule(data_with_notes(1)).await;
        tokio::time::sleep(Duration::from_millis(800)).await;
        autosave.schedule(data_with_notes(3)).await;

        // The first save would have landed by now
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(store.load_data().await.unwrap().notes.is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(store.load_data().await.unwrap().notes.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_writes_immediately_and_cancels_pending() {
        let (autosave, store, _temp) = create_test_service(1_000);

        autosave.schedule(data_with_notes(1)).await;
        autosave.flush(&data_with_notes(2)).await.unwrap();
        assert!(!autosave.is_pending().await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.load_data().await.unwrap().notes.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        // A file where the data directory should be makes every write fail
        let blocker = temp_dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();
        let store = Arc::new(JsonFileStore::new(blocker));
        let autosave = AutosaveService::new(store, 100);

        autosave.schedule(data_with_notes(1)).await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!autosave.is_pending().await);
        assert!(autosave.flush(&data_with_notes(1)).await.is_err());
    }
}
