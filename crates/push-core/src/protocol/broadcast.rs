//! Encoding a payload into an `am broadcast` invocation.
//!
//! The full command line (executable prepended by the caller) is:
//!
//! ```text
//! adb -s <device> shell am broadcast -a <action> [-n <component>] --es payload '<json>'
//! ```
//!
//! `adb shell` joins its arguments into a single string that the device's
//! `/system/bin/sh` re-parses, so every extra value is single-quoted here even
//! though the local process is spawned without a shell.
//!
//! # JSON payload shape
//!
//! ```json
//! {
//!   "name": "Promo", "title": "Sale", "body": "50% off",
//!   "channelId": "promotions", "collapseKey": "sale",
//!   "priority": "high", "icon": "ic_sale",
//!   "metadata": { "campaign": "spring" },
//!   "data": { "deeplink": "app://sale" }
//! }
//! ```
//!
//! Empty scalars and empty objects are omitted; `priority` is always present.
//! In RAW_JSON mode the `payload` extra carries the user's raw text instead
//! (see [`BroadcastEncoding`]).

use serde_json::{Map, Value};

use crate::domain::payload::{KeyValueField, PayloadMode, PushPayload};

/// Extra name carrying the JSON payload.
pub const PAYLOAD_EXTRA: &str = "payload";

/// How a STRUCTURED payload is turned into intent extras.
///
/// RAW_JSON payloads always travel as a single `payload` extra holding the
/// user's text as typed, not the structured encoding below.  That is what
/// the raw editor exists for; the structured fields of a RAW_JSON payload
/// are not sent.  Which of the two STRUCTURED forms receivers expect is
/// still unsettled, so both are kept and `JsonPayload` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BroadcastEncoding {
    /// One `--es payload <json>` extra holding the encoded payload.
    #[default]
    JsonPayload,
    /// One `--es <key> <value>` extra per non-blank field, with
    /// `metadata.<key>` / `data.<key>` for the key/value lists.  Kept for
    /// receivers written against older builds.
    Extras,
}

/// Wraps `value` in single quotes for a POSIX shell.
///
/// Embedded single quotes become `'\''` (close, escaped quote, reopen).
pub fn quote_for_shell(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Encodes the structured fields of `payload` as a compact JSON object.
pub fn encode_payload_json(payload: &PushPayload) -> String {
    let mut object = Map::new();
    let scalars = [
        ("name", &payload.name),
        ("title", &payload.title),
        ("body", &payload.body),
        ("channelId", &payload.channel_id),
        ("collapseKey", &payload.collapse_key),
        ("icon", &payload.icon),
    ];
    for (key, value) in scalars {
        if !value.is_empty() {
            object.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    object.insert(
        "priority".to_string(),
        Value::String(payload.priority.wire_name().to_string()),
    );

    let metadata = fields_to_object(&payload.metadata);
    if !metadata.is_empty() {
        object.insert("metadata".to_string(), Value::Object(metadata));
    }
    let data = fields_to_object(&payload.data_fields);
    if !data.is_empty() {
        object.insert("data".to_string(), Value::Object(data));
    }

    Value::Object(object).to_string()
}

/// Builds the argument vector after the executable.
///
/// The payload is expected to be sanitized already.
pub fn broadcast_args(
    device_id: &str,
    payload: &PushPayload,
    encoding: BroadcastEncoding,
) -> Vec<String> {
    let mut args: Vec<String> = ["-s", device_id, "shell", "am", "broadcast", "-a"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.push(payload.action.clone());
    if !payload.target_component.trim().is_empty() {
        args.push("-n".to_string());
        args.push(payload.target_component.clone());
    }

    match (payload.payload_mode, encoding) {
        (PayloadMode::RawJson, _) => {
            push_extra(&mut args, PAYLOAD_EXTRA, &payload.raw_json_payload);
        }
        (PayloadMode::Structured, BroadcastEncoding::JsonPayload) => {
            push_extra(&mut args, PAYLOAD_EXTRA, &encode_payload_json(payload));
        }
        (PayloadMode::Structured, BroadcastEncoding::Extras) => {
            for (key, value) in structured_extras(payload) {
                push_extra(&mut args, &key, &value);
            }
        }
    }
    args
}

fn push_extra(args: &mut Vec<String>, key: &str, value: &str) {
    args.push("--es".to_string());
    args.push(key.to_string());
    args.push(quote_for_shell(value));
}

/// Ordered `(extra name, value)` pairs for [`BroadcastEncoding::Extras`].
fn structured_extras(payload: &PushPayload) -> Vec<(String, String)> {
    let mut extras = Vec::new();
    let scalars = [
        ("title", payload.title.as_str()),
        ("body", payload.body.as_str()),
        ("channelId", payload.channel_id.as_str()),
        ("collapseKey", payload.collapse_key.as_str()),
        ("priority", payload.priority.wire_name()),
        ("icon", payload.icon.as_str()),
    ];
    for (key, value) in scalars {
        if !value.trim().is_empty() {
            extras.push((key.to_string(), value.to_string()));
        }
    }
    for (prefix, fields) in [("metadata", &payload.metadata), ("data", &payload.data_fields)] {
        for field in fields.iter().filter(|f| !f.key.trim().is_empty()) {
            extras.push((format!("{prefix}.{}", field.key), field.value.clone()));
        }
    }
    extras
}

/// Later duplicates overwrite earlier ones; blank keys are skipped.
fn fields_to_object(fields: &[KeyValueField]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|field| !field.key.trim().is_empty())
        .map(|field| (field.key.clone(), Value::String(field.value.clone())))
        .collect()
}
