//! Parser for `adb devices -l` output.
//!
//! Typical output:
//!
//! ```text
//! List of devices attached
//! emulator-5554          device product:sdk_gphone64_arm64 model:Pixel_7 transport_id:1
//! 0A171FDD40063C         unauthorized usb:1-1 transport_id:2
//! ```

use crate::domain::device::{AdbDevice, DeviceState};

const HEADER_PREFIX: &str = "List of devices";

/// Parses every device line in `stdout`, skipping blanks and the header.
pub fn parse_devices_output(stdout: &str) -> Vec<AdbDevice> {
    stdout.lines().filter_map(parse_device_line).collect()
}

/// Parses a single line.
///
/// Returns `None` for blank lines, the `List of devices` header, and lines
/// with fewer than two whitespace-separated tokens.
pub fn parse_device_line(line: &str) -> Option<AdbDevice> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(HEADER_PREFIX) {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    if tokens.len() < 2 {
        tracing::debug!(line = trimmed, "skipping device line with a single token");
        return None;
    }

    Some(AdbDevice {
        id: tokens[0].to_string(),
        state: DeviceState::from_token(tokens[1]),
        description: tokens[2..].join(" "),
    })
}
