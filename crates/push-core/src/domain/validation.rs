//! Save and send preconditions.
//!
//! Both checks run on the sanitized payload and short-circuit before any
//! I/O, so a rejected operation never touches the disk or spawns adb.

use thiserror::Error;

use super::payload::{PayloadMode, PushPayload};

/// Why a payload was rejected.  The `Display` text is shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required before saving")]
    NameRequired,
    #[error("Select a device before sending")]
    NoDeviceSelected,
    #[error("Add at least a title or body")]
    MissingTitleOrBody,
    #[error("Provide JSON payload content")]
    MissingRawJson,
}

/// Checks that a payload may be persisted as a preset.
pub fn validate_for_save(payload: &PushPayload) -> Result<(), ValidationError> {
    if payload.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    Ok(())
}

/// Checks that a payload may be broadcast to `device_id`.
///
/// A missing device is rejected regardless of payload content.
pub fn validate_for_send(
    device_id: Option<&str>,
    payload: &PushPayload,
) -> Result<(), ValidationError> {
    if device_id.map_or(true, |id| id.trim().is_empty()) {
        return Err(ValidationError::NoDeviceSelected);
    }
    match payload.payload_mode {
        PayloadMode::Structured
            if payload.title.trim().is_empty() && payload.body.trim().is_empty() =>
        {
            Err(ValidationError::MissingTitleOrBody)
        }
        PayloadMode::RawJson if payload.raw_json_payload.trim().is_empty() => {
            Err(ValidationError::MissingRawJson)
        }
        _ => Ok(()),
    }
}
