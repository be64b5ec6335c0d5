//! JSON file persistence
//!
//! Folders and notes live in `data.json`, reader settings in
//! `settings.json`, both inside one data directory. Each write goes to its
//! own temporary sibling first and is renamed into place.

use crate::config::{DATA_FILE_NAME, SETTINGS_FILE_NAME};
use crate::error::Result;
use crate::services::settings::ReaderSettings;
use crate::tree::AppData;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Boundary to whatever keeps notes and settings between runs
pub trait Persistence: Send + Sync + 'static {
    /// Load folders and notes; empty collections when nothing is stored yet
    fn load_data(&self) -> impl Future<Output = Result<AppData>> + Send;

    fn save_data(&self, data: &AppData) -> impl Future<Output = Result<()>> + Send;

    /// Load settings; `None` when nothing is stored yet
    fn load_settings(&self) -> impl Future<Output = Result<Option<ReaderSettings>>> + Send;

    fn save_settings(&self, settings: &ReaderSettings) -> impl Future<Output = Result<()>> + Send;
}

/// JSON files in a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given data directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the data directory if needed
    pub async fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        tracing::info!("Data store initialized at: {:?}", self.root);
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_path(&self) -> PathBuf {
        self.root.join(DATA_FILE_NAME)
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await?;
        let value = serde_json::from_str(&content)?;

        tracing::debug!("Read {:?} ({} bytes)", path, content.len());
        Ok(Some(value))
    }

    async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp file unique to this write, then rename (atomic write)
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        if let Err(e) = Self::write_then_rename(&temp_path, path, content.as_bytes()).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        tracing::debug!("Wrote {:?} ({} bytes)", path, content.len());
        Ok(())
    }

    async fn write_then_rename(temp_path: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        fs::rename(temp_path, path).await?;
        Ok(())
    }
}

impl Persistence for JsonFileStore {
    async fn load_data(&self) -> Result<AppData> {
        let data = Self::read_json::<AppData>(&self.data_path()).await?;
        Ok(data.unwrap_or_default())
    }

    async fn save_data(&self, data: &AppData) -> Result<()> {
        Self::write_json(&self.data_path(), data).await
    }

    async fn load_settings(&self) -> Result<Option<ReaderSettings>> {
        Self::read_json(&self.settings_path()).await
    }

    async fn save_settings(&self, settings: &ReaderSettings) -> Result<()> {
        Self::write_json(&self.settings_path(), settings).await
    }
}
