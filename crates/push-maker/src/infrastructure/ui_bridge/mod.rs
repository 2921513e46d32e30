//! Front-end bridge: drives the controller on behalf of a headless host.
//!
//! The desktop UI is not part of this crate.  What lives here is the contract
//! any front end needs: a [`Session`] that wires the real adapters into a
//! [`PushMakerController`], one async function per user-level command, and
//! JSON-friendly DTOs for the results.  The `push-maker` binary is the only
//! consumer today.
//!
//! # Data Transfer Objects (DTOs)
//!
//! Internal types such as [`UiState`] carry editing details (blank rows,
//! dialog flags) that a command-line user does not care about.  The DTOs
//! here keep only what is printed: a device line, a preset summary, the adb
//! status.
//!
//! # `CommandResult<T>` wrapper
//!
//! Every command returns `CommandResult<T>` rather than `Result<T, E>`, so a
//! `--json` response always has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.

pub mod dialogs;

use std::path::PathBuf;
use std::sync::Arc;

use push_core::{
    sanitize, AdbDevice, DeviceState, KeyValueField, PayloadMode, PushPayload, PushPriority,
};
use serde::{Deserialize, Serialize};

use crate::application::ports::{CommandOutcome, DeviceBridge, ExecutableLocator, FileDialogs};
use crate::application::state::{ADB_ERROR_PREFIX, MSG_PUSH_DELETED, MSG_PUSH_SAVED};
use crate::application::{PushMakerController, Services, UiState};
use crate::infrastructure::adb::{AdbClient, AdbConfig, AdbLocator};
use crate::infrastructure::storage::{JsonPresetStore, JsonSettingsStore, StoragePaths};

pub use dialogs::HeadlessDialogs;

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One connected device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDto {
    pub id: String,
    pub state: DeviceState,
    pub description: String,
}

impl From<&AdbDevice> for DeviceDto {
    fn from(d: &AdbDevice) -> Self {
        Self {
            id: d.id.clone(),
            state: d.state,
            description: d.description.clone(),
        }
    }
}

/// One line of the saved preset list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSummaryDto {
    pub id: String,
    pub name: String,
    pub title: String,
    pub payload_mode: PayloadMode,
    /// RFC 3339, UTC.
    pub updated_at: String,
}

impl From<&PushPayload> for PresetSummaryDto {
    fn from(p: &PushPayload) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            title: p.title.clone(),
            payload_mode: p.payload_mode,
            updated_at: chrono::DateTime::<chrono::Utc>::from_timestamp_millis(p.updated_at)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        }
    }
}

/// Configured and effective adb executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdbStatusDto {
    /// Saved path; `None` means adb is taken from `$ADB` or `PATH`.
    pub adb_path: Option<String>,
    /// What the next command will spawn.
    pub executable: String,
    pub message: Option<String>,
}

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Command inputs ────────────────────────────────────────────────────────────

/// Payload edits requested on the command line.  Unset fields keep the value
/// of the starting payload (a blank push, or the preset named by `preset`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushDraft {
    /// Saved preset to start from, by id or name.
    pub preset: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub action: Option<String>,
    pub target_component: Option<String>,
    pub channel_id: Option<String>,
    pub collapse_key: Option<String>,
    pub icon: Option<String>,
    pub priority: Option<PushPriority>,
    pub metadata: Vec<(String, String)>,
    pub data: Vec<(String, String)>,
    /// Switches to RAW_JSON mode with this file's content.
    pub raw_json_file: Option<PathBuf>,
}

impl PushDraft {
    fn apply_fields(self, base: PushPayload) -> PushPayload {
        let mut p = base;
        let scalars = [
            (self.name, &mut p.name),
            (self.title, &mut p.title),
            (self.body, &mut p.body),
            (self.action, &mut p.action),
            (self.target_component, &mut p.target_component),
            (self.channel_id, &mut p.channel_id),
            (self.collapse_key, &mut p.collapse_key),
            (self.icon, &mut p.icon),
        ];
        for (value, slot) in scalars {
            if let Some(v) = value {
                *slot = v;
            }
        }
        if let Some(priority) = self.priority {
            p.priority = priority;
        }
        p.metadata
            .extend(self.metadata.into_iter().map(|(k, v)| KeyValueField::new(k, v)));
        p.data_fields
            .extend(self.data.into_iter().map(|(k, v)| KeyValueField::new(k, v)));
        p
    }
}

/// What `adb-path` should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdbPathAction {
    Show,
    Detect,
    Clear,
    Set(String),
}

/// Parses `key=value`; the value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

// ── Session ───────────────────────────────────────────────────────────────────

/// A running controller plus the handles a headless host needs.
pub struct Session {
    controller: PushMakerController,
    bridge: Arc<dyn DeviceBridge>,
    dialogs: Arc<HeadlessDialogs>,
}

impl Session {
    /// Real adb client, environment-based locator, JSON stores under `paths`.
    pub fn open(paths: &StoragePaths, adb: AdbConfig) -> Self {
        Self::with_parts(
            paths,
            Arc::new(AdbClient::new(adb)),
            Arc::new(AdbLocator::from_process_env()),
        )
    }

    /// Same wiring with a caller-supplied bridge and locator.
    pub fn with_parts(
        paths: &StoragePaths,
        bridge: Arc<dyn DeviceBridge>,
        locator: Arc<dyn ExecutableLocator>,
    ) -> Self {
        let dialogs = Arc::new(HeadlessDialogs::new());
        let services = Services {
            bridge: Arc::clone(&bridge),
            presets: Arc::new(JsonPresetStore::new(paths.pushes_file())),
            settings: Arc::new(JsonSettingsStore::new(paths.settings_file())),
            locator,
            dialogs: Arc::clone(&dialogs) as Arc<dyn FileDialogs>,
        };
        Self {
            controller: PushMakerController::spawn(services),
            bridge,
            dialogs,
        }
    }

    pub fn controller(&self) -> &PushMakerController {
        &self.controller
    }

    /// Full startup: presets, adb resolution, device list.
    pub async fn start(&self) -> UiState {
        self.controller.initialize();
        self.settle().await
    }

    /// Lists connected devices.
    pub async fn devices(&self) -> CommandResult<Vec<DeviceDto>> {
        let state = self.start().await;
        match state.message.as_deref() {
            Some(m) if m.starts_with(ADB_ERROR_PREFIX) => CommandResult::err(m),
            _ => CommandResult::ok(state.devices.iter().map(DeviceDto::from).collect()),
        }
    }

    /// Builds a payload from `draft` and broadcasts it to `device` (or the
    /// first connected device).
    pub async fn send(&self, device: Option<String>, draft: PushDraft) -> CommandResult<String> {
        let state = self.start().await;
        if let Err(e) = self.prepare(&state, draft).await {
            return CommandResult::err(e);
        }
        if let Some(id) = device {
            self.controller.select_device(id);
        }

        self.controller.send_current_push();
        let state = self.settle().await;
        match state.last_send {
            Some(CommandOutcome::Success(message)) => CommandResult::ok(message),
            Some(CommandOutcome::Failure(message)) => CommandResult::err(message),
            None => CommandResult::err(state.message.unwrap_or_else(|| "Push not sent".into())),
        }
    }

    /// Saves `draft` as a preset (updating it when `draft.preset` names one).
    pub async fn save(&self, draft: PushDraft) -> CommandResult<PresetSummaryDto> {
        let state = self.load_presets().await;
        if let Err(e) = self.prepare(&state, draft).await {
            return CommandResult::err(e);
        }

        self.controller.save_current_push();
        let state = self.settle().await;
        match state.message.as_deref() {
            Some(MSG_PUSH_SAVED) => CommandResult::ok(PresetSummaryDto::from(&state.current_push)),
            other => CommandResult::err(other.unwrap_or("Push not saved")),
        }
    }

    /// Saved presets, newest first.
    pub async fn list(&self) -> CommandResult<Vec<PresetSummaryDto>> {
        let state = self.load_presets().await;
        match state.message {
            Some(e) => CommandResult::err(e),
            None => CommandResult::ok(
                state
                    .saved_pushes
                    .iter()
                    .map(PresetSummaryDto::from)
                    .collect(),
            ),
        }
    }

    /// The stored form of one preset.
    pub async fn show(&self, reference: &str) -> CommandResult<PushPayload> {
        let state = self.load_presets().await;
        if let Some(e) = state.message {
            return CommandResult::err(e);
        }
        match find_preset(&state.saved_pushes, reference) {
            Some(p) => CommandResult::ok(sanitize(p.clone())),
            None => CommandResult::err(no_match(reference)),
        }
    }

    /// Deletes one preset; returns its id.
    pub async fn delete(&self, reference: &str) -> CommandResult<String> {
        let state = self.load_presets().await;
        if let Some(e) = state.message {
            return CommandResult::err(e);
        }
        let Some(id) = find_preset(&state.saved_pushes, reference).map(|p| p.id.clone()) else {
            return CommandResult::err(no_match(reference));
        };

        self.controller.remove_saved_push(id.clone());
        let state = self.settle().await;
        match state.message.as_deref() {
            Some(MSG_PUSH_DELETED) => CommandResult::ok(id),
            other => CommandResult::err(other.unwrap_or("Push not deleted")),
        }
    }

    /// Shows or changes the adb executable through the settings flow.
    pub async fn adb_path(&self, action: AdbPathAction) -> CommandResult<AdbStatusDto> {
        let state = self.start().await;
        if action == AdbPathAction::Show {
            return CommandResult::ok(self.status(&state));
        }

        self.controller.open_settings();
        match action {
            AdbPathAction::Detect => self.controller.detect_adb_path_from_settings(),
            AdbPathAction::Clear => self.controller.update_settings_adb_path_input(""),
            AdbPathAction::Set(path) => {
                self.dialogs.queue_adb_executable(path);
                self.controller.browse_adb_path_from_settings();
            }
            AdbPathAction::Show => {}
        }
        let state = self.settle().await;
        if let Some(e) = state.settings_error {
            return CommandResult::err(e);
        }

        self.controller.save_adb_path_from_settings();
        let state = self.settle().await;
        match state.settings_error.clone() {
            Some(e) => CommandResult::err(e),
            None => CommandResult::ok(self.status(&state)),
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    async fn settle(&self) -> UiState {
        self.controller.settled().await;
        self.controller.state()
    }

    async fn load_presets(&self) -> UiState {
        self.controller.reload_saved_pushes();
        self.settle().await
    }

    /// Loads the starting preset and applies the draft to the editor.
    async fn prepare(&self, state: &UiState, draft: PushDraft) -> Result<(), String> {
        match &draft.preset {
            Some(reference) => {
                let preset = find_preset(&state.saved_pushes, reference)
                    .ok_or_else(|| no_match(reference))?;
                self.controller.load_saved_push(preset.id.clone());
            }
            None => self.controller.clear_current_push(),
        }
        self.controller.consume_message();

        let raw_json_file = draft.raw_json_file.clone();
        self.controller.update_current_push(move |p| draft.apply_fields(p));
        if let Some(path) = raw_json_file {
            self.dialogs.queue_raw_json_file(path);
            self.controller.import_raw_json_from_file();
            self.controller.update_payload_mode(PayloadMode::RawJson);
        }

        match self.settle().await.message {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn status(&self, state: &UiState) -> AdbStatusDto {
        AdbStatusDto {
            adb_path: state.adb_path.clone(),
            executable: self.bridge.current_executable(),
            message: state.message.clone(),
        }
    }
}

/// Exact id match first, then the newest preset with that name.
fn find_preset<'a>(pushes: &'a [PushPayload], reference: &str) -> Option<&'a PushPayload> {
    pushes
        .iter()
        .find(|p| p.id == reference)
        .or_else(|| pushes.iter().find(|p| p.name == reference))
}

fn no_match(reference: &str) -> String {
    format!("No saved push matches '{reference}'")
}
