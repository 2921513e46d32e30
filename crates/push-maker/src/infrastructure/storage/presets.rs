//! Saved push presets in `pushes.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use push_core::PushPayload;
use tracing::debug;

use crate::application::ports::PresetRepository;

use super::json_document::{JsonDocument, StoreError};

/// [`PresetRepository`] over a JSON array file.
pub struct JsonPresetStore {
    doc: JsonDocument<Vec<PushPayload>>,
}

impl JsonPresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            doc: JsonDocument::new(path),
        }
    }

    /// All presets in file order.
    pub async fn list_presets(&self) -> Result<Vec<PushPayload>, StoreError> {
        self.doc.read().await
    }

    /// Drops any preset with the same id and appends `payload`.
    pub async fn upsert_preset(&self, payload: PushPayload) -> Result<(), StoreError> {
        let id = payload.id.clone();
        let replaced = self
            .doc
            .update(move |pushes| {
                let before = pushes.len();
                pushes.retain(|p| p.id != payload.id);
                let replaced = pushes.len() != before;
                pushes.push(payload);
                replaced
            })
            .await?;
        debug!(id = %id, replaced, "preset upserted");
        Ok(())
    }

    /// Removes the preset with `id`.  Unknown ids are not an error.
    pub async fn delete_preset(&self, id: &str) -> Result<(), StoreError> {
        let removed = self
            .doc
            .update(|pushes| {
                let before = pushes.len();
                pushes.retain(|p| p.id != id);
                before - pushes.len()
            })
            .await?;
        debug!(id = %id, removed, "preset deleted");
        Ok(())
    }
}

#[async_trait]
impl PresetRepository for JsonPresetStore {
    async fn list(&self) -> Result<Vec<PushPayload>, String> {
        self.list_presets().await.map_err(|e| e.to_string())
    }

    async fn upsert(&self, payload: PushPayload) -> Result<(), String> {
        self.upsert_preset(payload).await.map_err(|e| e.to_string())
    }

    async fn delete(&self, id: &str) -> Result<(), String> {
        self.delete_preset(id).await.map_err(|e| e.to_string())
    }
}
