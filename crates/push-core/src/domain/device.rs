//! Connected Android device as reported by the debug bridge.

use serde::{Deserialize, Serialize};

/// Connection state of a device, derived from the second column of
/// `adb devices -l`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceState {
    /// `device` – the bridge can talk to it.
    Online,
    /// `offline` – known to the bridge but not responding.
    Offline,
    /// `unauthorized` – the user has not accepted the RSA key prompt yet.
    Unauthorized,
    /// Anything else (`recovery`, `sideload`, `no permissions`, ...).
    Unknown,
}

impl DeviceState {
    /// Classifies a state token case-insensitively by substring.
    ///
    /// The checks run in a fixed order, so a token containing both
    /// `device` and `offline` is reported as [`DeviceState::Online`].
    pub fn from_token(token: &str) -> Self {
        let lower = token.to_lowercase();
        if lower.contains("device") {
            DeviceState::Online
        } else if lower.contains("offline") {
            DeviceState::Offline
        } else if lower.contains("unauthorized") {
            DeviceState::Unauthorized
        } else {
            DeviceState::Unknown
        }
    }
}

/// A device line observed in bridge output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdbDevice {
    /// Serial number, passed back to the bridge as `-s <id>`.
    pub id: String,
    /// Remaining descriptor tokens (`product:... model:...`) joined by spaces.
    pub description: String,
    pub state: DeviceState,
}
