//! [`FileDialogs`] for front ends without a windowing toolkit.
//!
//! A headless host knows the answer before the controller asks: the CLI
//! queues the path it was given on the command line, and the next "dialog"
//! returns it.  An empty queue behaves like a cancelled dialog.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::FileDialogs;

#[derive(Debug, Default)]
pub struct HeadlessDialogs {
    raw_json_file: Mutex<Option<PathBuf>>,
    adb_executable: Mutex<Option<PathBuf>>,
}

impl HeadlessDialogs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for the next raw JSON file request.
    pub fn queue_raw_json_file(&self, path: impl Into<PathBuf>) {
        *lock(&self.raw_json_file) = Some(path.into());
    }

    /// Answer for the next executable request.
    pub fn queue_adb_executable(&self, path: impl Into<PathBuf>) {
        *lock(&self.adb_executable) = Some(path.into());
    }
}

#[async_trait]
impl FileDialogs for HeadlessDialogs {
    async fn pick_raw_json_file(&self) -> Result<Option<PathBuf>, String> {
        Ok(lock(&self.raw_json_file).take())
    }

    async fn pick_adb_executable(&self) -> Result<Option<PathBuf>, String> {
        Ok(lock(&self.adb_executable).take())
    }
}

fn lock(slot: &Mutex<Option<PathBuf>>) -> std::sync::MutexGuard<'_, Option<PathBuf>> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_answer_is_returned_once() {
        let dialogs = HeadlessDialogs::new();
        dialogs.queue_raw_json_file("/tmp/payload.json");

        assert_eq!(
            dialogs.pick_raw_json_file().await,
            Ok(Some(PathBuf::from("/tmp/payload.json")))
        );
        assert_eq!(dialogs.pick_raw_json_file().await, Ok(None));
        assert_eq!(dialogs.pick_adb_executable().await, Ok(None));
    }
}
