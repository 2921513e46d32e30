//! The observable UI state and the reducer that owns every change to it.
//!
//! # Reducer pattern (for beginners)
//!
//! Every user intent ("save", "send", "open settings") and every completed
//! background job ("devices loaded", "push sent") is a [`Msg`].  The
//! [`update`] function is the *only* code allowed to modify [`UiState`]:
//!
//! ```text
//!            ┌───────────── Msg ──────────────┐
//!            ▼                                │
//!   update(&mut UiState, Msg) ──► Vec<Effect> ─┘  (effects run off the actor
//!            │                                    and report back as Msg)
//!            ▼
//!   snapshot published to the UI
//! ```
//!
//! `update` does no I/O.  Anything that touches adb, the disk, or a file
//! dialog is returned as an [`Effect`] for the controller runtime to execute.
//! Validation failures are therefore decided here, before any effect exists,
//! which is what guarantees that an invalid send never spawns a process.

use push_core::{
    blank_push, ensure_editable, sanitize, validate_for_save, validate_for_send, AdbDevice,
    PushPayload,
};

use super::ports::CommandOutcome;

pub const ADB_ERROR_PREFIX: &str = "ADB error: ";
pub const MSG_NO_DEVICES: &str = "No ADB devices detected";
pub const MSG_PUSH_SAVED: &str = "Push saved";
pub const MSG_PUSH_DELETED: &str = "Push deleted";
pub const MSG_PUSH_SENT: &str = "Push sent";
pub const MSG_ADB_NOT_FOUND: &str = "ADB not found. Set the path in settings.";
pub const MSG_USING_PATH_ADB: &str = "Using adb from PATH";
pub const ERR_NOT_EXECUTABLE: &str = "File not found or not executable";
pub const ERR_DETECT_FAILED: &str = "Could not locate platform-tools automatically";

/// Everything the front end renders.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub devices: Vec<AdbDevice>,
    pub selected_device_id: Option<String>,
    pub is_refreshing_devices: bool,
    /// Private editing copy; never aliased with a stored preset.
    pub current_push: PushPayload,
    /// Sorted by `updated_at`, newest first.
    pub saved_pushes: Vec<PushPayload>,
    pub is_sending: bool,
    /// Single transient message slot; cleared by [`Msg::ConsumeMessage`].
    pub message: Option<String>,
    /// Configured executable, `None` when falling back to PATH.
    pub adb_path: Option<String>,
    pub is_settings_open: bool,
    pub settings_adb_path_input: String,
    pub settings_error: Option<String>,
    /// Outcome of the most recent broadcast, for front ends that need more
    /// than the message text.
    pub last_send: Option<CommandOutcome>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            devices: Vec::new(),
            selected_device_id: None,
            is_refreshing_devices: false,
            current_push: blank_push(),
            saved_pushes: Vec::new(),
            is_sending: false,
            message: None,
            adb_path: None,
            is_settings_open: false,
            settings_adb_path_input: String::new(),
            settings_error: None,
            last_send: None,
        }
    }
}

/// Edit applied to the current payload.
pub type PushTransform = Box<dyn FnOnce(PushPayload) -> PushPayload + Send>;

/// Intents from the UI and completions of background effects.
pub enum Msg {
    // ── Intents ───────────────────────────────────────────────────────────────
    Initialize,
    RefreshDevices,
    ReloadSavedPushes,
    SelectDevice(String),
    EditCurrentPush(PushTransform),
    ClearCurrentPush,
    LoadSavedPush(String),
    RemoveSavedPush(String),
    SaveCurrentPush,
    SendCurrentPush,
    ImportRawJsonFromFile,
    ConsumeMessage,
    OpenSettings,
    CloseSettings,
    UpdateSettingsAdbPathInput(String),
    SaveAdbPathFromSettings,
    DetectAdbPathFromSettings,
    BrowseAdbPathFromSettings,

    // ── Completions ───────────────────────────────────────────────────────────
    DevicesLoaded(Result<Vec<AdbDevice>, String>),
    SavedPushesLoaded(Result<Vec<PushPayload>, String>),
    PushSaved(Result<PushPayload, String>),
    PushDeleted(Result<(), String>),
    PushSent(CommandOutcome),
    /// `Ok(None)` means the user cancelled the dialog.
    RawJsonImported(Result<Option<String>, String>),
    /// Startup resolution finished; `None` means nothing usable was found.
    AdbPathResolved(Option<String>),
    /// Settings dialog path was validated, applied, and persisted.
    AdbPathSaved(Result<Option<String>, String>),
    AdbPathRejected(String),
    AdbPathDetected(Option<String>),
    AdbPathBrowsed(Result<Option<String>, String>),
}

impl Msg {
    /// Variant name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Msg::Initialize => "Initialize",
            Msg::RefreshDevices => "RefreshDevices",
            Msg::ReloadSavedPushes => "ReloadSavedPushes",
            Msg::SelectDevice(_) => "SelectDevice",
            Msg::EditCurrentPush(_) => "EditCurrentPush",
            Msg::ClearCurrentPush => "ClearCurrentPush",
            Msg::LoadSavedPush(_) => "LoadSavedPush",
            Msg::RemoveSavedPush(_) => "RemoveSavedPush",
            Msg::SaveCurrentPush => "SaveCurrentPush",
            Msg::SendCurrentPush => "SendCurrentPush",
            Msg::ImportRawJsonFromFile => "ImportRawJsonFromFile",
            Msg::ConsumeMessage => "ConsumeMessage",
            Msg::OpenSettings => "OpenSettings",
            Msg::CloseSettings => "CloseSettings",
            Msg::UpdateSettingsAdbPathInput(_) => "UpdateSettingsAdbPathInput",
            Msg::SaveAdbPathFromSettings => "SaveAdbPathFromSettings",
            Msg::DetectAdbPathFromSettings => "DetectAdbPathFromSettings",
            Msg::BrowseAdbPathFromSettings => "BrowseAdbPathFromSettings",
            Msg::DevicesLoaded(_) => "DevicesLoaded",
            Msg::SavedPushesLoaded(_) => "SavedPushesLoaded",
            Msg::PushSaved(_) => "PushSaved",
            Msg::PushDeleted(_) => "PushDeleted",
            Msg::PushSent(_) => "PushSent",
            Msg::RawJsonImported(_) => "RawJsonImported",
            Msg::AdbPathResolved(_) => "AdbPathResolved",
            Msg::AdbPathSaved(_) => "AdbPathSaved",
            Msg::AdbPathRejected(_) => "AdbPathRejected",
            Msg::AdbPathDetected(_) => "AdbPathDetected",
            Msg::AdbPathBrowsed(_) => "AdbPathBrowsed",
        }
    }
}

/// Background work requested by [`update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ListDevices,
    LoadSavedPushes,
    /// Stamp `updated_at` and upsert.
    SavePush(PushPayload),
    DeletePush(String),
    SendPush {
        device_id: String,
        payload: PushPayload,
    },
    /// Saved setting if still executable, else auto-detect.
    ResolveAdbPathOnStartup,
    /// Validate (when `Some`), persist, and apply a path from the dialog.
    ApplyAdbPath(Option<String>),
    DetectAdbPath,
    BrowseAdbPath,
    ImportRawJson,
}

/// Applies `msg` to `state` and returns the effects to run.
pub fn update(state: &mut UiState, msg: Msg) -> Vec<Effect> {
    match msg {
        Msg::Initialize => {
            state.is_refreshing_devices = true;
            vec![Effect::LoadSavedPushes, Effect::ResolveAdbPathOnStartup]
        }
        Msg::RefreshDevices => {
            state.is_refreshing_devices = true;
            vec![Effect::ListDevices]
        }
        Msg::ReloadSavedPushes => vec![Effect::LoadSavedPushes],
        Msg::SelectDevice(id) => {
            state.selected_device_id = Some(id);
            vec![]
        }
        Msg::EditCurrentPush(transform) => {
            state.current_push = ensure_editable(transform(state.current_push.clone()));
            vec![]
        }
        Msg::ClearCurrentPush => {
            state.current_push = blank_push();
            vec![]
        }
        Msg::LoadSavedPush(id) => {
            if let Some(saved) = state.saved_pushes.iter().find(|p| p.id == id) {
                state.current_push = ensure_editable(saved.clone());
            }
            vec![]
        }
        Msg::RemoveSavedPush(id) => vec![Effect::DeletePush(id)],
        Msg::SaveCurrentPush => {
            let payload = sanitize(state.current_push.clone());
            match validate_for_save(&payload) {
                Ok(()) => vec![Effect::SavePush(payload)],
                Err(e) => {
                    state.message = Some(e.to_string());
                    vec![]
                }
            }
        }
        Msg::SendCurrentPush => {
            let payload = sanitize(state.current_push.clone());
            let device = state.selected_device_id.clone();
            match validate_for_send(device.as_deref(), &payload) {
                Ok(()) => {
                    state.is_sending = true;
                    vec![Effect::SendPush {
                        // validate_for_send rejects a missing device.
                        device_id: device.unwrap_or_default(),
                        payload,
                    }]
                }
                Err(e) => {
                    state.message = Some(e.to_string());
                    vec![]
                }
            }
        }
        Msg::ImportRawJsonFromFile => vec![Effect::ImportRawJson],
        Msg::ConsumeMessage => {
            state.message = None;
            vec![]
        }
        Msg::OpenSettings => {
            if let Some(path) = &state.adb_path {
                state.settings_adb_path_input = path.clone();
            }
            state.is_settings_open = true;
            state.settings_error = None;
            vec![]
        }
        Msg::CloseSettings => {
            state.is_settings_open = false;
            state.settings_error = None;
            vec![]
        }
        Msg::UpdateSettingsAdbPathInput(value) => {
            state.settings_adb_path_input = value;
            vec![]
        }
        Msg::SaveAdbPathFromSettings => {
            let input = state.settings_adb_path_input.trim();
            let path = (!input.is_empty()).then(|| input.to_string());
            vec![Effect::ApplyAdbPath(path)]
        }
        Msg::DetectAdbPathFromSettings => vec![Effect::DetectAdbPath],
        Msg::BrowseAdbPathFromSettings => vec![Effect::BrowseAdbPath],

        Msg::DevicesLoaded(Ok(devices)) => {
            state.selected_device_id = reconcile_selection(state.selected_device_id.take(), &devices);
            if devices.is_empty() {
                state.message = Some(MSG_NO_DEVICES.to_string());
            }
            state.devices = devices;
            state.is_refreshing_devices = false;
            vec![]
        }
        Msg::DevicesLoaded(Err(e)) => {
            state.devices.clear();
            state.selected_device_id = None;
            state.is_refreshing_devices = false;
            state.message = Some(format!("{ADB_ERROR_PREFIX}{e}"));
            vec![]
        }
        Msg::SavedPushesLoaded(Ok(mut pushes)) => {
            pushes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
            state.saved_pushes = pushes.into_iter().map(ensure_editable).collect();
            vec![]
        }
        Msg::SavedPushesLoaded(Err(e)) => {
            state.message = Some(format!("Failed to load saved pushes: {e}"));
            vec![]
        }
        Msg::PushSaved(Ok(stored)) => {
            state.current_push = ensure_editable(stored);
            state.message = Some(MSG_PUSH_SAVED.to_string());
            vec![Effect::LoadSavedPushes]
        }
        Msg::PushSaved(Err(e)) => {
            state.message = Some(format!("Failed to save push: {e}"));
            vec![]
        }
        Msg::PushDeleted(Ok(())) => {
            state.message = Some(MSG_PUSH_DELETED.to_string());
            vec![Effect::LoadSavedPushes]
        }
        Msg::PushDeleted(Err(e)) => {
            state.message = Some(format!("Failed to delete push: {e}"));
            vec![]
        }
        Msg::PushSent(outcome) => {
            state.is_sending = false;
            let text = outcome.message().trim();
            state.message = Some(if text.is_empty() {
                MSG_PUSH_SENT.to_string()
            } else {
                text.to_string()
            });
            state.last_send = Some(outcome);
            vec![]
        }
        Msg::RawJsonImported(Ok(Some(content))) => {
            let mut payload = state.current_push.clone();
            payload.raw_json_payload = content;
            state.current_push = ensure_editable(payload);
            vec![]
        }
        Msg::RawJsonImported(Ok(None)) => vec![],
        Msg::RawJsonImported(Err(e)) => {
            state.message = Some(e);
            vec![]
        }
        Msg::AdbPathResolved(path) => {
            if path.is_none() {
                state.message = Some(MSG_ADB_NOT_FOUND.to_string());
            }
            state.settings_adb_path_input = path.clone().unwrap_or_default();
            state.settings_error = None;
            state.adb_path = path;
            state.is_refreshing_devices = true;
            vec![Effect::ListDevices]
        }
        Msg::AdbPathSaved(Ok(path)) => {
            state.message = Some(match &path {
                Some(p) => format!("Using ADB at {p}"),
                None => MSG_USING_PATH_ADB.to_string(),
            });
            state.settings_adb_path_input = path.clone().unwrap_or_default();
            state.adb_path = path;
            state.is_settings_open = false;
            state.settings_error = None;
            state.is_refreshing_devices = true;
            vec![Effect::ListDevices]
        }
        Msg::AdbPathSaved(Err(e)) => {
            state.settings_error = Some(format!("Failed to save settings: {e}"));
            vec![]
        }
        Msg::AdbPathRejected(reason) => {
            state.settings_error = Some(reason);
            vec![]
        }
        Msg::AdbPathDetected(Some(path)) => {
            state.settings_adb_path_input = path;
            state.settings_error = None;
            vec![]
        }
        Msg::AdbPathDetected(None) => {
            state.settings_error = Some(ERR_DETECT_FAILED.to_string());
            vec![]
        }
        Msg::AdbPathBrowsed(Ok(Some(path))) => {
            state.settings_adb_path_input = path;
            state.settings_error = None;
            vec![]
        }
        Msg::AdbPathBrowsed(Ok(None)) => vec![],
        Msg::AdbPathBrowsed(Err(e)) => {
            state.message = Some(format!("File picker error: {e}"));
            vec![]
        }
    }
}

/// Keeps the previous selection if it is still connected, else picks the
/// first device.
fn reconcile_selection(previous: Option<String>, devices: &[AdbDevice]) -> Option<String> {
    previous
        .filter(|id| devices.iter().any(|d| &d.id == id))
        .or_else(|| devices.first().map(|d| d.id.clone()))
}
