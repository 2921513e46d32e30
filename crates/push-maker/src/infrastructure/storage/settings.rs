//! The settings record in `settings.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use push_core::AppSettings;
use tracing::debug;

use crate::application::ports::SettingsRepository;

use super::json_document::{JsonDocument, StoreError};

/// [`SettingsRepository`] over a single JSON object file.
pub struct JsonSettingsStore {
    doc: JsonDocument<AppSettings>,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
        }
    }

    pub async fn load(&self) -> Result<AppSettings, StoreError> {
        self.doc.read().await
    }

    /// Replaces the whole record.
    pub async fn store(&self, settings: &AppSettings) -> Result<(), StoreError> {
        self.doc.replace(settings).await?;
        debug!(adb_path = ?settings.adb_path, "settings saved");
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsStore {
    async fn get(&self) -> Result<AppSettings, String> {
        self.load().await.map_err(|e| e.to_string())
    }

    async fn save(&self, settings: AppSettings) -> Result<(), String> {
        self.store(&settings).await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fresh_store_returns_default_settings() {
        let dir = TempDir::new().unwrap();
        let s = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(s.load().await.unwrap(), AppSettings::default());
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips_path() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let s = JsonSettingsStore::new(&path);
        let settings = AppSettings::with_adb_path(Some("/opt/sdk/platform-tools/adb".to_string()));

        // Act
        s.store(&settings).await.unwrap();

        // Assert
        let reread = JsonSettingsStore::new(&path).load().await.unwrap();
        assert_eq!(reread, settings);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"adbPath\""));
    }

    #[tokio::test]
    async fn test_clearing_path_removes_key_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let s = JsonSettingsStore::new(&path);
        s.store(&AppSettings::with_adb_path(Some("/opt/adb".to_string())))
            .await
            .unwrap();

        s.store(&AppSettings::default()).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "{}");
    }
}
