//! Settings service
//!
//! Manages reader settings persistence through the persistence
//! collaborator. Loading never fails: missing or unreadable settings fall
//! back to defaults.

use crate::config::{
    DEFAULT_AUTO_SAVE_DELAY_MS, DEFAULT_TRAINING_INCREMENT, DEFAULT_WPM, MAX_AUTO_SAVE_DELAY_MS,
    MAX_TRAINING_INCREMENT, MAX_WPM, MIN_AUTO_SAVE_DELAY_MS, MIN_TRAINING_INCREMENT, MIN_WPM,
};
use crate::error::{AppError, Result};
use crate::reader::{PacingConfig, PacingToggles};
use crate::storage::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reader and autosave settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderSettings {
    /// Base speed in words per minute
    #[serde(default = "default_wpm")]
    pub wpm: u32,
    #[serde(default = "default_true")]
    pub adapt_word_length: bool,
    #[serde(default = "default_true")]
    pub adapt_punctuation: bool,
    #[serde(default = "default_true")]
    pub adapt_complexity: bool,
    #[serde(default)]
    pub training_mode: bool,
    /// WPM added every training step
    #[serde(default = "default_training_increment")]
    pub training_increment: u32,
    /// Autosave debounce in milliseconds
    #[serde(default = "default_auto_save_delay")]
    pub auto_save_delay: u32,
}

fn default_true() -> bool {
    true
}

fn default_wpm() -> u32 {
    DEFAULT_WPM
}

fn default_training_increment() -> u32 {
    DEFAULT_TRAINING_INCREMENT
}

fn default_auto_save_delay() -> u32 {
    DEFAULT_AUTO_SAVE_DELAY_MS
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            wpm: default_wpm(),
            adapt_word_length: true,
            adapt_punctuation: true,
            adapt_complexity: true,
            training_mode: false,
            training_increment: default_training_increment(),
            auto_save_delay: default_auto_save_delay(),
        }
    }
}

impl ReaderSettings {
    /// Reject values outside the accepted ranges
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WPM..=MAX_WPM).contains(&self.wpm) {
            return Err(AppError::InvalidSettings(format!(
                "wpm must be between {} and {}, got {}",
                MIN_WPM, MAX_WPM, self.wpm
            )));
        }
        if !(MIN_TRAINING_INCREMENT..=MAX_TRAINING_INCREMENT).contains(&self.training_increment) {
            return Err(AppError::InvalidSettings(format!(
                "training increment must be between {} and {}, got {}",
                MIN_TRAINING_INCREMENT, MAX_TRAINING_INCREMENT, self.training_increment
            )));
        }
        if !(MIN_AUTO_SAVE_DELAY_MS..=MAX_AUTO_SAVE_DELAY_MS).contains(&self.auto_save_delay) {
            return Err(AppError::InvalidSettings(format!(
                "auto-save delay must be between {} and {} ms, got {}",
                MIN_AUTO_SAVE_DELAY_MS, MAX_AUTO_SAVE_DELAY_MS, self.auto_save_delay
            )));
        }
        Ok(())
    }

    /// Pull out-of-range values back into range
    pub fn clamped(mut self) -> Self {
        self.wpm = self.wpm.clamp(MIN_WPM, MAX_WPM);
        self.training_increment = self
            .training_increment
            .clamp(MIN_TRAINING_INCREMENT, MAX_TRAINING_INCREMENT);
        self.auto_save_delay = self
            .auto_save_delay
            .clamp(MIN_AUTO_SAVE_DELAY_MS, MAX_AUTO_SAVE_DELAY_MS);
        self
    }

    pub fn toggles(&self) -> PacingToggles {
        PacingToggles {
            adapt_word_length: self.adapt_word_length,
            adapt_punctuation: self.adapt_punctuation,
            adapt_complexity: self.adapt_complexity,
        }
    }

    pub fn pacing(&self) -> PacingConfig {
        PacingConfig {
            wpm: self.wpm,
            toggles: self.toggles(),
            training_mode: self.training_mode,
            training_increment: self.training_increment,
        }
    }
}

/// Service for managing reader settings
pub struct SettingsService<P> {
    persistence: Arc<P>,
}

impl<P> Clone for SettingsService<P> {
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
        }
    }
}

impl<P: Persistence> SettingsService<P> {
    pub fn new(persistence: Arc<P>) -> Self {
        Self { persistence }
    }

    /// Load settings, falling back to defaults when none are stored or the
    /// stored ones cannot be read
    pub async fn load(&self) -> ReaderSettings {
        match self.persistence.load_settings().await {
            Ok(Some(settings)) => {
                if let Err(e) = settings.validate() {
                    tracing::warn!("Stored settings out of range, clamping: {}", e);
                    return settings.clamped();
                }
                settings
            }
            Ok(None) => {
                tracing::info!("No stored settings, using defaults");
                ReaderSettings::default()
            }
            Err(e) => {
                tracing::warn!("Failed to load settings, using defaults: {}", e);
                ReaderSettings::default()
            }
        }
    }

    /// Validate and save settings
    pub async fn save(&self, settings: &ReaderSettings) -> Result<()> {
        settings.validate()?;
        self.persistence.save_settings(settings).await?;
        tracing::info!("Settings saved");
        Ok(())
    }

    /// Update the base speed
    pub async fn update_wpm(&self, wpm: u32) -> Result<ReaderSettings> {
        let mut settings = self.load().await;
        settings.wpm = wpm;
        self.save(&settings).await?;
        Ok(settings)
    }

    /// Update the adaptation toggles
    pub async fn update_toggles(&self, toggles: PacingToggles) -> Result<ReaderSettings> {
        let mut settings = self.load().await;
        settings.adapt_word_length = toggles.adapt_word_length;
        settings.adapt_punctuation = toggles.adapt_punctuation;
        settings.adapt_complexity = toggles.adapt_complexity;
        self.save(&settings).await?;
        Ok(settings)
    }

    /// Update training mode
    pub async fn update_training(&self, enabled: bool, increment: u32) -> Result<ReaderSettings> {
        let mut settings = self.load().await;
        settings.training_mode = enabled;
        settings.training_increment = increment;
        self.save(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStore;
    use tempfile::TempDir;

    fn create_test_service() -> (SettingsService<JsonFileStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().to_path_buf());
        (SettingsService::new(Arc::new(store)), temp_dir)
    }

    #[tokio::test]
    async fn test_defaults_when_nothing_stored() {
        let (service, _temp) = create_test_service();

        let settings = service.load().await;

        assert_eq!(settings, ReaderSettings::default());
        assert_eq!(settings.wpm, 300);
        assert!(!settings.training_mode);
        assert_eq!(settings.training_increment, 10);
    }

    #[tokio::test]
    async fn test_update_preserves_other_fields() {
        let (service, _temp) = create_test_service();

        service.update_training(true, 25).await.unwrap();
        service.update_wpm(420).await.unwrap();

        let loaded = service.load().await;
        assert_eq!(loaded.wpm, 420);
        assert!(loaded.training_mode);
        assert_eq!(loaded.training_increment, 25);
        assert!(loaded.adapt_punctuation);
    }

    #[tokio::test]
    async fn test_out_of_range_update_is_rejected() {
        let (service, _temp) = create_test_service();

        let result = service.update_wpm(900).await;

        assert!(matches!(result, Err(AppError::InvalidSettings(_))));
        assert_eq!(service.load().await.wpm, 300);
    }

    #[tokio::test]
    async fn test_unreadable_settings_fall_back_to_defaults() {
        let (service, temp) = create_test_service();
        tokio::fs::write(temp.path().join("settings.json"), "garbage")
            .await
            .unwrap();

        assert_eq!(service.load().await, ReaderSettings::default());
    }

    #[tokio::test]
    async fn test_partial_settings_file_fills_defaults() {
        let (service, temp) = create_test_service();
        tokio::fs::write(
            temp.path().join("settings.json"),
            r#"{"wpm": 5000, "trainingMode": true}"#,
        )
        .await
        .unwrap();

        let settings = service.load().await;

        assert_eq!(settings.wpm, 800);
        assert!(settings.training_mode);
        assert!(settings.adapt_word_length);
        assert_eq!(settings.auto_save_delay, 1_000);
    }

    #[test]
    fn test_pacing_config_mirrors_settings() {
        let settings = ReaderSettings {
            wpm: 500,
            adapt_complexity: false,
            training_mode: true,
            ..ReaderSettings::default()
        };

        let pacing = settings.pacing();

        assert_eq!(pacing.wpm, 500);
        assert!(pacing.toggles.adapt_word_length);
        assert!(!pacing.toggles.adapt_complexity);
        assert!(pacing.training_mode);
    }
}
