//! The push payload: one push-notification test case.
//!
//! A payload lives in two shapes:
//!
//! - the **editable** shape held by the controller while the user types, which
//!   always has at least one (possibly empty) metadata row and data row so a
//!   form can render an input for them ([`ensure_editable`]);
//! - the **sanitized** shape that is persisted or transmitted, with blank
//!   rows removed and the action defaulted ([`sanitize`]).
//!
//! The two passes have different invariants and must not be merged.
//!
//! # Persisted JSON layout
//!
//! Field names are camelCase and every field is optional on read, so a
//! preset written by an older build (or hand-edited) still loads:
//!
//! ```json
//! {
//!   "id": "3f2c9a...",
//!   "action": "com.pushmaker.DEBUG_PUSH",
//!   "name": "Order shipped",
//!   "title": "Your order is on the way",
//!   "priority": "HIGH",
//!   "metadata": [{ "id": "a1...", "key": "campaign", "value": "spring" }],
//!   "payloadMode": "STRUCTURED",
//!   "updatedAt": 1718000000000
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Broadcast action used when the user leaves the action blank.
pub const DEFAULT_PUSH_ACTION: &str = "com.pushmaker.DEBUG_PUSH";

/// Notification priority forwarded to the receiving app.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushPriority {
    Normal,
    #[default]
    High,
}

impl PushPriority {
    /// Lowercase name used on the wire (`"normal"` / `"high"`).
    pub fn wire_name(self) -> &'static str {
        match self {
            PushPriority::Normal => "normal",
            PushPriority::High => "high",
        }
    }
}

/// How the payload content is expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayloadMode {
    /// Discrete named fields (title, body, metadata, data, ...).
    #[default]
    Structured,
    /// An opaque JSON blob typed or imported by the user.
    RawJson,
}

/// One metadata or data entry.
///
/// `id` only gives UI list rows a stable identity; keys need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueField {
    pub id: String,
    pub key: String,
    pub value: String,
}

impl KeyValueField {
    /// Creates a field with a fresh identity.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: random_id(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// `true` when both key and value are blank.
    pub fn is_blank(&self) -> bool {
        self.key.trim().is_empty() && self.value.trim().is_empty()
    }
}

impl Default for KeyValueField {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// A push-notification test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PushPayload {
    /// Opaque identifier; immutable after creation.
    pub id: String,
    pub action: String,
    /// Optional explicit receiver (`com.example/.DebugPushReceiver`).
    pub target_component: String,
    /// Display label; required to save, not to send.
    pub name: String,
    pub title: String,
    pub body: String,
    pub channel_id: String,
    pub collapse_key: String,
    pub priority: PushPriority,
    pub icon: String,
    pub metadata: Vec<KeyValueField>,
    pub data_fields: Vec<KeyValueField>,
    pub payload_mode: PayloadMode,
    /// Only meaningful when `payload_mode` is [`PayloadMode::RawJson`].
    pub raw_json_payload: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; advances on every persisted mutation.
    pub updated_at: i64,
}

impl Default for PushPayload {
    fn default() -> Self {
        let now = now_millis();
        Self {
            id: random_id(),
            action: DEFAULT_PUSH_ACTION.to_string(),
            target_component: String::new(),
            name: String::new(),
            title: String::new(),
            body: String::new(),
            channel_id: String::new(),
            collapse_key: String::new(),
            priority: PushPriority::default(),
            icon: String::new(),
            metadata: Vec::new(),
            data_fields: Vec::new(),
            payload_mode: PayloadMode::default(),
            raw_json_payload: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A fresh payload ready for the editor: default action and one empty
/// metadata row and data row.
pub fn blank_push() -> PushPayload {
    ensure_editable(PushPayload::default())
}

/// Prepares a payload for display in an editable form.
///
/// Guarantees both field lists have at least one row.  Blank rows are kept.
pub fn ensure_editable(payload: PushPayload) -> PushPayload {
    let mut payload = payload;
    if payload.action.trim().is_empty() {
        payload.action = DEFAULT_PUSH_ACTION.to_string();
    }
    payload.target_component = payload.target_component.trim().to_string();
    if payload.metadata.is_empty() {
        payload.metadata.push(KeyValueField::default());
    }
    if payload.data_fields.is_empty() {
        payload.data_fields.push(KeyValueField::default());
    }
    payload
}

/// Normalises a payload before it is saved or sent.
///
/// Defaults a blank action, trims the target component and raw JSON, and
/// drops field rows whose key and value are both blank.  Idempotent.
pub fn sanitize(payload: PushPayload) -> PushPayload {
    let mut payload = payload;
    if payload.action.trim().is_empty() {
        payload.action = DEFAULT_PUSH_ACTION.to_string();
    }
    payload.target_component = payload.target_component.trim().to_string();
    payload.metadata.retain(|field| !field.is_blank());
    payload.data_fields.retain(|field| !field.is_blank());
    payload.raw_json_payload = payload.raw_json_payload.trim().to_string();
    payload
}

/// Stamps `updated_at` for a persisted mutation.
///
/// Uses the wall clock, but never moves backwards or stands still relative
/// to the previous stamp, so two saves within the same millisecond still
/// order correctly.
pub fn touch(payload: PushPayload) -> PushPayload {
    let mut payload = payload;
    payload.updated_at = now_millis().max(payload.updated_at.saturating_add(1));
    payload
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn random_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messy_payload() -> PushPayload {
        PushPayload {
            action: "   ".to_string(),
            target_component: "  com.example/.Receiver \n".to_string(),
            metadata: vec![
                KeyValueField::new("", ""),
                KeyValueField::new("campaign", "spring"),
                KeyValueField::new("  ", " "),
            ],
            data_fields: vec![KeyValueField::new("", "orphan-value")],
            raw_json_payload: "  {\"a\":1}  ".to_string(),
            ..PushPayload::default()
        }
    }

    #[test]
    fn test_default_payload_uses_default_action_and_high_priority() {
        let payload = PushPayload::default();
        assert_eq!(payload.action, DEFAULT_PUSH_ACTION);
        assert_eq!(payload.priority, PushPriority::High);
        assert_eq!(payload.payload_mode, PayloadMode::Structured);
        assert_eq!(payload.created_at, payload.updated_at);
    }

    #[test]
    fn test_default_payloads_have_distinct_ids() {
        assert_ne!(PushPayload::default().id, PushPayload::default().id);
    }

    #[test]
    fn test_blank_push_has_one_empty_row_per_list() {
        let payload = blank_push();
        assert_eq!(payload.metadata.len(), 1);
        assert_eq!(payload.data_fields.len(), 1);
        assert!(payload.metadata[0].is_blank());
        assert!(payload.data_fields[0].is_blank());
    }

    #[test]
    fn test_sanitize_drops_blank_rows_and_defaults_action() {
        // Arrange
        let payload = messy_payload();

        // Act
        let clean = sanitize(payload);

        // Assert
        assert_eq!(clean.action, DEFAULT_PUSH_ACTION);
        assert_eq!(clean.target_component, "com.example/.Receiver");
        assert_eq!(clean.metadata.len(), 1);
        assert_eq!(clean.metadata[0].key, "campaign");
        // A row with only a value is still meaningful.
        assert_eq!(clean.data_fields.len(), 1);
        assert_eq!(clean.raw_json_payload, "{\"a\":1}");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = vec![messy_payload(), blank_push(), PushPayload::default()];
        for payload in samples {
            let once = sanitize(payload);
            let twice = sanitize(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_ensure_editable_always_yields_at_least_one_row() {
        let samples = vec![
            sanitize(messy_payload()),
            sanitize(blank_push()),
            PushPayload::default(),
        ];
        for payload in samples {
            let editable = ensure_editable(payload);
            assert!(!editable.metadata.is_empty());
            assert!(!editable.data_fields.is_empty());
        }
    }

    #[test]
    fn test_ensure_editable_keeps_blank_rows() {
        let editable = ensure_editable(messy_payload());
        assert_eq!(editable.metadata.len(), 3);
    }

    #[test]
    fn test_touch_advances_updated_at_even_when_clock_is_behind() {
        // Arrange: a stamp far in the future, as if written by a skewed clock.
        let payload = PushPayload {
            updated_at: i64::MAX / 2,
            ..PushPayload::default()
        };

        // Act
        let touched = touch(payload.clone());

        // Assert
        assert_eq!(touched.updated_at, payload.updated_at + 1);
        assert_eq!(touched.created_at, payload.created_at);
    }

    #[test]
    fn test_deserialize_uses_camel_case_and_fills_missing_fields() {
        // Arrange
        let json = r#"{
            "id": "abc",
            "name": "Promo",
            "targetComponent": "com.example/.R",
            "payloadMode": "RAW_JSON",
            "rawJsonPayload": "{}",
            "priority": "NORMAL",
            "someFutureField": true
        }"#;

        // Act
        let payload: PushPayload = serde_json::from_str(json).expect("deserialize");

        // Assert
        assert_eq!(payload.id, "abc");
        assert_eq!(payload.target_component, "com.example/.R");
        assert_eq!(payload.payload_mode, PayloadMode::RawJson);
        assert_eq!(payload.priority, PushPriority::Normal);
        assert_eq!(payload.action, DEFAULT_PUSH_ACTION);
        assert!(payload.metadata.is_empty());
    }

    #[test]
    fn test_serialize_writes_camel_case_keys() {
        let json = serde_json::to_value(PushPayload::default()).expect("serialize");
        assert!(json.get("dataFields").is_some());
        assert!(json.get("rawJsonPayload").is_some());
        assert_eq!(json["payloadMode"], "STRUCTURED");
        assert_eq!(json["priority"], "HIGH");
    }
}
