//! Persisted application settings.

use serde::{Deserialize, Serialize};

/// The single settings record stored in `settings.json`.
///
/// ```json
/// { "adbPath": "/opt/android-sdk/platform-tools/adb" }
/// ```
///
/// An absent `adbPath` means "search automatically / use `adb` from PATH".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adb_path: Option<String>,
}

impl AppSettings {
    /// Builds a settings record, treating a blank path as absent.
    pub fn with_adb_path(path: Option<String>) -> Self {
        Self {
            adb_path: path.filter(|p| !p.trim().is_empty()),
        }
    }
}
