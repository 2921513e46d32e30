//! adb client configuration.
//!
//! [`AdbConfig`] is a plain struct with no global state and no environment
//! reads.  `main` fills it from CLI arguments; tests build it directly.

use std::time::Duration;

use push_core::BroadcastEncoding;

/// Environment variable naming an explicit adb executable.
pub const ADB_ENV_VAR: &str = "ADB";

/// Command name used when neither an override nor [`ADB_ENV_VAR`] is set.
pub const DEFAULT_ADB_COMMAND: &str = "adb";

/// Upper bound on any single adb invocation.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Where users can download the platform-tools package.
pub const PLATFORM_TOOLS_DOWNLOAD_URL: &str =
    "https://developer.android.com/tools/releases/platform-tools";

/// Runtime configuration for [`AdbClient`](super::AdbClient).
///
/// | Field             | Default              |
/// |-------------------|----------------------|
/// | executable        | `None` (env / PATH)  |
/// | command_timeout   | 15 seconds           |
/// | encoding          | `JsonPayload`        |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdbConfig {
    /// Explicit executable path.  `None` falls back to `$ADB`, then `adb`.
    pub executable: Option<String>,

    /// How long to wait for adb before killing it.
    pub command_timeout: Duration,

    /// How STRUCTURED payloads become intent extras.
    pub encoding: BroadcastEncoding,
}

impl Default for AdbConfig {
    fn default() -> Self {
        Self {
            executable: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            encoding: BroadcastEncoding::JsonPayload,
        }
    }
}
