//! A typed JSON document on disk with serialised read-modify-write.
//!
//! # Lifecycle of one update (for beginners)
//!
//! ```text
//! lock ─► ensure file exists ─► read + decode ─► mutate in memory
//!      ─► encode (pretty) ─► write <file>.tmp ─► rename over <file> ─► unlock
//! ```
//!
//! A missing file is created empty and then read as the default value; a
//! file containing only whitespace also decodes to the default.  Any other
//! decode failure is reported, never silently replaced.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

/// Error type for the JSON stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither the platform data variable nor a home directory is set.
    #[error("could not determine platform data directory")]
    NoPlatformDataDir,

    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not valid JSON for the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One JSON file holding a `T`.
pub struct JsonDocument<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents.
    pub async fn read(&self) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Reads, applies `mutate`, and writes the result back, all under the lock.
    pub async fn update<F, R>(&self, mutate: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.lock.lock().await;
        let mut value = self.read_unlocked().await?;
        let result = mutate(&mut value);
        self.write_unlocked(&value).await?;
        Ok(result)
    }

    /// Overwrites the document with `value`.
    pub async fn replace(&self, value: &T) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.ensure_exists().await?;
        self.write_unlocked(value).await
    }

    async fn read_unlocked(&self) -> Result<T, StoreError> {
        self.ensure_exists().await?;
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        if content.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_unlocked(&self, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), bytes = json.len(), "document written");
        Ok(())
    }

    async fn ensure_exists(&self) -> Result<(), StoreError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        if exists {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        tokio::fs::write(&self.path, b"")
            .await
            .map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), "created empty document");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    type Counters = BTreeMap<String, u32>;

    #[tokio::test]
    async fn test_missing_file_is_created_and_reads_as_default() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");
        let doc: JsonDocument<Counters> = JsonDocument::new(&path);

        // Act
        let value = doc.read().await.unwrap();

        // Assert
        assert!(value.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_whitespace_file_reads_as_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "  \n").unwrap();
        let doc: JsonDocument<Counters> = JsonDocument::new(&path);

        assert!(doc.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, "{ not json").unwrap();
        let doc: JsonDocument<Counters> = JsonDocument::new(&path);

        let err = doc.read().await.unwrap_err();

        assert!(matches!(err, StoreError::Parse { .. }), "{err}");
        // The broken file is left for the user to inspect.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[tokio::test]
    async fn test_update_writes_pretty_json_and_leaves_no_temp_file() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.json");
        let doc: JsonDocument<Counters> = JsonDocument::new(&path);

        // Act
        let previous = doc
            .update(|m| m.insert("a".to_string(), 1))
            .await
            .unwrap();

        // Assert
        assert_eq!(previous, None);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains('\n'), "expected pretty output: {text}");
        assert_eq!(doc.read().await.unwrap().get("a"), Some(&1));
        assert!(!dir.path().join("doc.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let doc: std::sync::Arc<JsonDocument<Counters>> =
            std::sync::Arc::new(JsonDocument::new(dir.path().join("doc.json")));

        // Act
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..25 {
            let doc = std::sync::Arc::clone(&doc);
            tasks.spawn(async move {
                doc.update(|m| *m.entry("hits".to_string()).or_insert(0) += 1)
                    .await
                    .unwrap();
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap();
        }

        // Assert
        assert_eq!(doc.read().await.unwrap().get("hits"), Some(&25));
    }

    #[tokio::test]
    async fn test_replace_overwrites_whole_document() {
        let dir = TempDir::new().unwrap();
        let doc: JsonDocument<Counters> = JsonDocument::new(dir.path().join("doc.json"));
        doc.update(|m| m.insert("old".to_string(), 1)).await.unwrap();

        let fresh: Counters = [("new".to_string(), 2)].into_iter().collect();
        doc.replace(&fresh).await.unwrap();

        assert_eq!(doc.read().await.unwrap(), fresh);
    }
}
