//! # push-core
//!
//! Shared library for PushMaker containing the push payload model, the
//! editing/validation rules, and the adb broadcast encoding.
//!
//! This crate has zero dependencies on OS APIs, subprocesses, the file
//! system, or UI frameworks.  Everything here is a pure function over plain
//! data, so it can be tested on any machine without adb installed.
//!
//! # Architecture overview (for beginners)
//!
//! PushMaker lets a developer compose a push-notification test payload and
//! deliver it to an Android device through `adb shell am broadcast`.  The
//! receiving app registers a broadcast receiver for the debug action and
//! turns the extras into a notification, exactly as if it had come from the
//! push provider.
//!
//! - **`domain`** – The data being edited and stored: [`PushPayload`],
//!   its key/value fields, the connected [`AdbDevice`] descriptor, and the
//!   persisted [`AppSettings`].  Also holds the rules that decide whether a
//!   payload may be saved or sent.
//!
//! - **`protocol`** – How a payload travels to the device.  `adb` output is
//!   parsed into devices, and payloads are encoded into the argument vector
//!   of an `am broadcast` invocation (JSON payload + shell quoting).

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `push_core::PushPayload` instead of `push_core::domain::payload::PushPayload`.
pub use domain::device::{AdbDevice, DeviceState};
pub use domain::payload::{
    blank_push, ensure_editable, sanitize, touch, KeyValueField, PayloadMode, PushPayload,
    PushPriority, DEFAULT_PUSH_ACTION,
};
pub use domain::settings::AppSettings;
pub use domain::validation::{validate_for_save, validate_for_send, ValidationError};
pub use protocol::broadcast::{
    broadcast_args, encode_payload_json, quote_for_shell, BroadcastEncoding,
};
pub use protocol::devices::{parse_device_line, parse_devices_output};
