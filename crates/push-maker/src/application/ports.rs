//! Abstractions the controller depends on.
//!
//! Infrastructure implementations shell out to adb and read/write JSON files;
//! test implementations record calls.  All of them are injected into the
//! controller at construction time.

use std::path::PathBuf;

use async_trait::async_trait;
use push_core::{AdbDevice, AppSettings, PushPayload};

/// Result of a command sent through the debug bridge.
///
/// A non-zero exit is a normal outcome carrying diagnostic text, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Success(String),
    Failure(String),
}

impl CommandOutcome {
    pub fn message(&self) -> &str {
        match self {
            CommandOutcome::Success(message) | CommandOutcome::Failure(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

/// Talks to connected devices.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// Replaces the executable override and returns the executable that
    /// subsequent calls will use.  `None` falls back to the environment/PATH.
    fn set_executable(&self, path: Option<String>) -> String;

    /// Executable that the next call will spawn.
    fn current_executable(&self) -> String;

    /// Lists connected devices.  Errors carry a human-readable message.
    async fn list_devices(&self) -> Result<Vec<AdbDevice>, String>;

    /// Broadcasts `payload` to `device_id`.  Never fails outright: launch
    /// problems are reported as [`CommandOutcome::Failure`].
    async fn send_push(&self, device_id: &str, payload: &PushPayload) -> CommandOutcome;
}

/// Durable collection of saved presets.
#[async_trait]
pub trait PresetRepository: Send + Sync {
    /// All presets, in storage order.
    async fn list(&self) -> Result<Vec<PushPayload>, String>;

    /// Replaces any preset with the same id, or appends a new one.
    async fn upsert(&self, payload: PushPayload) -> Result<(), String>;

    async fn delete(&self, id: &str) -> Result<(), String>;
}

/// Durable settings record.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self) -> Result<AppSettings, String>;

    async fn save(&self, settings: AppSettings) -> Result<(), String>;
}

/// Finds a usable bridge executable on disk.
pub trait ExecutableLocator: Send + Sync {
    /// Searches the override variable and SDK locations.  `None` is a normal
    /// "not configured" outcome.
    fn detect(&self) -> Option<String>;

    /// `true` iff `path` (after `~` expansion) is an existing, regular,
    /// executable file.
    fn is_executable(&self, path: &str) -> bool;
}

/// User-driven file selection, supplied by whatever front end hosts the
/// controller.  The core never depends on a GUI toolkit.
#[async_trait]
pub trait FileDialogs: Send + Sync {
    /// Asks for a JSON file to import as the raw payload.
    async fn pick_raw_json_file(&self) -> Result<Option<PathBuf>, String>;

    /// Asks for the adb executable.
    async fn pick_adb_executable(&self) -> Result<Option<PathBuf>, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_outcome_message_and_success_flag() {
        let ok = CommandOutcome::Success("Broadcast completed".to_string());
        let failed = CommandOutcome::Failure("ADB exited with 1".to_string());
        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert_eq!(failed.message(), "ADB exited with 1");
    }
}
