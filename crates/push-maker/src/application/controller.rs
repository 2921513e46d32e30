//! PushMakerController: the single owner of [`UiState`].
//!
//! # Actor model (for beginners)
//!
//! The controller spawns one background task (the *actor*) that holds the
//! only mutable copy of the state.  Public methods never touch the state
//! directly; they post a [`Msg`] into the actor's inbox and return at once.
//!
//! ```text
//!  UI thread ──Msg──►  inbox  ──►  actor: update(&mut state, msg)
//!                                    │          │
//!                      watch::Sender ◄┘          └─► JoinSet<Msg>
//!                      (snapshot)                    (adb, disk, dialogs)
//!                                                        │
//!                                   completion Msg ◄─────┘
//! ```
//!
//! Because every change goes through the same task, two operations can never
//! interleave a read-modify-write of the same field.  Each applied message
//! publishes a complete [`UiState`] snapshot; observers never see a half
//! applied update.
//!
//! Shutting down ([`PushMakerController::dispose`] or dropping the
//! controller) aborts the actor, which drops its `JoinSet` and with it every
//! in-flight unit of work.

use std::sync::Arc;

use push_core::{touch, AppSettings, PayloadMode, PushPayload, PushPriority};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use super::ports::{
    DeviceBridge, ExecutableLocator, FileDialogs, PresetRepository, SettingsRepository,
};
use super::state::{update, Effect, Msg, UiState, ERR_NOT_EXECUTABLE};

/// The collaborators the controller drives.
#[derive(Clone)]
pub struct Services {
    pub bridge: Arc<dyn DeviceBridge>,
    pub presets: Arc<dyn PresetRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub locator: Arc<dyn ExecutableLocator>,
    pub dialogs: Arc<dyn FileDialogs>,
}

enum Envelope {
    Msg(Msg),
    /// Answered once the inbox ahead of it is applied and no effect is running.
    Flush(oneshot::Sender<()>),
}

/// Handle to the running controller actor.
pub struct PushMakerController {
    inbox: mpsc::UnboundedSender<Envelope>,
    state: watch::Receiver<UiState>,
    actor: JoinHandle<()>,
}

impl PushMakerController {
    /// Starts the actor on the current Tokio runtime.
    ///
    /// Nothing is loaded until [`initialize`](Self::initialize) is called.
    pub fn spawn(services: Services) -> Self {
        let (inbox, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(UiState::default());
        let actor = tokio::spawn(run_actor(services, rx, state_tx));
        Self {
            inbox,
            state,
            actor,
        }
    }

    // ── Observation ───────────────────────────────────────────────────────────

    /// Latest published snapshot.
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.clone()
    }

    /// Waits until every message posted so far has been applied and all the
    /// work it triggered (including follow-up work) has completed.
    pub async fn settled(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.inbox.send(Envelope::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    /// Stops the actor and cancels all in-flight work.
    pub fn dispose(self) {
        // Drop does the work.
    }

    // ── Startup and devices ───────────────────────────────────────────────────

    /// Loads saved presets, resolves the adb executable, then lists devices.
    pub fn initialize(&self) {
        self.dispatch(Msg::Initialize);
    }

    pub fn refresh_devices(&self) {
        self.dispatch(Msg::RefreshDevices);
    }

    pub fn select_device(&self, device_id: impl Into<String>) {
        self.dispatch(Msg::SelectDevice(device_id.into()));
    }

    // ── Editing ───────────────────────────────────────────────────────────────

    /// Applies `transform` to the current payload.
    pub fn update_current_push<F>(&self, transform: F)
    where
        F: FnOnce(PushPayload) -> PushPayload + Send + 'static,
    {
        self.dispatch(Msg::EditCurrentPush(Box::new(transform)));
    }

    pub fn update_priority(&self, priority: PushPriority) {
        self.update_current_push(move |p| PushPayload { priority, ..p });
    }

    pub fn update_payload_mode(&self, payload_mode: PayloadMode) {
        self.update_current_push(move |p| PushPayload { payload_mode, ..p });
    }

    pub fn update_raw_json_payload(&self, raw_json_payload: impl Into<String>) {
        let raw_json_payload = raw_json_payload.into();
        self.update_current_push(move |p| PushPayload {
            raw_json_payload,
            ..p
        });
    }

    pub fn clear_current_push(&self) {
        self.dispatch(Msg::ClearCurrentPush);
    }

    /// Asks the host for a JSON file and loads it into the raw payload.
    pub fn import_raw_json_from_file(&self) {
        self.dispatch(Msg::ImportRawJsonFromFile);
    }

    // ── Presets ───────────────────────────────────────────────────────────────

    pub fn reload_saved_pushes(&self) {
        self.dispatch(Msg::ReloadSavedPushes);
    }

    pub fn load_saved_push(&self, id: impl Into<String>) {
        self.dispatch(Msg::LoadSavedPush(id.into()));
    }

    pub fn remove_saved_push(&self, id: impl Into<String>) {
        self.dispatch(Msg::RemoveSavedPush(id.into()));
    }

    pub fn save_current_push(&self) {
        self.dispatch(Msg::SaveCurrentPush);
    }

    // ── Sending ───────────────────────────────────────────────────────────────

    pub fn send_current_push(&self) {
        self.dispatch(Msg::SendCurrentPush);
    }

    /// Clears the transient message after the UI has shown it.
    pub fn consume_message(&self) {
        self.dispatch(Msg::ConsumeMessage);
    }

    // ── Settings dialog ───────────────────────────────────────────────────────

    pub fn open_settings(&self) {
        self.dispatch(Msg::OpenSettings);
    }

    pub fn close_settings(&self) {
        self.dispatch(Msg::CloseSettings);
    }

    pub fn update_settings_adb_path_input(&self, value: impl Into<String>) {
        self.dispatch(Msg::UpdateSettingsAdbPathInput(value.into()));
    }

    /// Validates, persists, and applies the path typed in the dialog.  A blank
    /// input selects adb from `PATH`.
    pub fn save_adb_path_from_settings(&self) {
        self.dispatch(Msg::SaveAdbPathFromSettings);
    }

    pub fn detect_adb_path_from_settings(&self) {
        self.dispatch(Msg::DetectAdbPathFromSettings);
    }

    pub fn browse_adb_path_from_settings(&self) {
        self.dispatch(Msg::BrowseAdbPathFromSettings);
    }

    fn dispatch(&self, msg: Msg) {
        let name = msg.name();
        if self.inbox.send(Envelope::Msg(msg)).is_err() {
            warn!(msg = name, "controller stopped, message dropped");
        }
    }
}

impl Drop for PushMakerController {
    fn drop(&mut self) {
        self.actor.abort();
    }
}

// ── Actor loop ────────────────────────────────────────────────────────────────

async fn run_actor(
    services: Services,
    mut inbox: mpsc::UnboundedReceiver<Envelope>,
    state_tx: watch::Sender<UiState>,
) {
    let mut state = UiState::default();
    let mut effects: JoinSet<Msg> = JoinSet::new();
    let mut waiters: Vec<oneshot::Sender<()>> = Vec::new();

    loop {
        tokio::select! {
            envelope = inbox.recv() => match envelope {
                Some(Envelope::Msg(msg)) => {
                    apply(&mut state, msg, &services, &mut effects, &state_tx);
                }
                Some(Envelope::Flush(done)) => waiters.push(done),
                None => break,
            },
            Some(joined) = effects.join_next(), if !effects.is_empty() => match joined {
                Ok(msg) => apply(&mut state, msg, &services, &mut effects, &state_tx),
                Err(e) => warn!(error = %e, "background task ended abnormally"),
            },
        }

        if effects.is_empty() {
            for done in waiters.drain(..) {
                let _ = done.send(());
            }
        }
    }
    debug!("controller actor stopped");
}

fn apply(
    state: &mut UiState,
    msg: Msg,
    services: &Services,
    effects: &mut JoinSet<Msg>,
    state_tx: &watch::Sender<UiState>,
) {
    debug!(msg = msg.name(), "applying message");
    let requested = update(state, msg);
    state_tx.send_replace(state.clone());
    for effect in requested {
        effects.spawn(run_effect(services.clone(), effect));
    }
}

// ── Effect execution ──────────────────────────────────────────────────────────

async fn run_effect(services: Services, effect: Effect) -> Msg {
    match effect {
        Effect::ListDevices => Msg::DevicesLoaded(services.bridge.list_devices().await),
        Effect::LoadSavedPushes => Msg::SavedPushesLoaded(services.presets.list().await),
        Effect::SavePush(payload) => {
            let stored = touch(payload);
            let result = services.presets.upsert(stored.clone()).await;
            if result.is_ok() {
                info!(id = %stored.id, name = %stored.name, "push saved");
            }
            Msg::PushSaved(result.map(|()| stored))
        }
        Effect::DeletePush(id) => {
            let result = services.presets.delete(&id).await;
            if result.is_ok() {
                info!(id = %id, "push deleted");
            }
            Msg::PushDeleted(result)
        }
        Effect::SendPush { device_id, payload } => {
            let outcome = services.bridge.send_push(&device_id, &payload).await;
            if outcome.is_success() {
                info!(device = %device_id, action = %payload.action, "push sent");
            } else {
                warn!(device = %device_id, outcome = %outcome.message(), "push failed");
            }
            Msg::PushSent(outcome)
        }
        Effect::ResolveAdbPathOnStartup => {
            Msg::AdbPathResolved(resolve_startup_executable(&services).await)
        }
        Effect::ApplyAdbPath(path) => apply_adb_path(&services, path).await,
        Effect::DetectAdbPath => Msg::AdbPathDetected(detect(&services.locator).await),
        Effect::BrowseAdbPath => Msg::AdbPathBrowsed(
            services
                .dialogs
                .pick_adb_executable()
                .await
                .map(|picked| picked.map(|p| p.display().to_string())),
        ),
        Effect::ImportRawJson => Msg::RawJsonImported(import_raw_json(&services).await),
    }
}

/// Saved path if still usable, else an auto-detected one (persisted when no
/// valid saved path existed).  Applies the result to the bridge.
async fn resolve_startup_executable(services: &Services) -> Option<String> {
    let (saved, read_ok) = match services.settings.get().await {
        Ok(settings) => (settings.adb_path, true),
        Err(e) => {
            warn!(error = %e, "could not read settings, falling back to detection");
            (None, false)
        }
    };

    if let Some(path) = saved {
        if is_executable(&services.locator, &path).await {
            let effective = services.bridge.set_executable(Some(path.clone()));
            info!(executable = %effective, "using saved adb path");
            return Some(path);
        }
        warn!(path = %path, "saved adb path is no longer executable");
    }

    match detect(&services.locator).await {
        Some(path) => {
            if read_ok {
                let settings = AppSettings::with_adb_path(Some(path.clone()));
                if let Err(e) = services.settings.save(settings).await {
                    warn!(error = %e, "could not persist detected adb path");
                }
            }
            let effective = services.bridge.set_executable(Some(path.clone()));
            info!(executable = %effective, "using detected adb path");
            Some(path)
        }
        None => {
            let effective = services.bridge.set_executable(None);
            info!(executable = %effective, "no adb found, falling back to PATH");
            None
        }
    }
}

async fn apply_adb_path(services: &Services, path: Option<String>) -> Msg {
    if let Some(p) = &path {
        if !is_executable(&services.locator, p).await {
            return Msg::AdbPathRejected(ERR_NOT_EXECUTABLE.to_string());
        }
    }
    let settings = AppSettings::with_adb_path(path.clone());
    if let Err(e) = services.settings.save(settings).await {
        return Msg::AdbPathSaved(Err(e));
    }
    let effective = services.bridge.set_executable(path.clone());
    info!(executable = %effective, "adb path updated");
    Msg::AdbPathSaved(Ok(path))
}

async fn import_raw_json(services: &Services) -> Result<Option<String>, String> {
    let picked = services
        .dialogs
        .pick_raw_json_file()
        .await
        .map_err(|e| format!("File picker error: {e}"))?;
    let Some(path) = picked else {
        return Ok(None);
    };
    let content = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("Failed to read file: {e}"))?;
    debug!(path = %path.display(), bytes = content.len(), "raw JSON imported");
    Ok(Some(content))
}

// Locator calls stat the filesystem; keep them off the async workers.

async fn detect(locator: &Arc<dyn ExecutableLocator>) -> Option<String> {
    let locator = Arc::clone(locator);
    tokio::task::spawn_blocking(move || locator.detect())
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "adb detection task failed");
            None
        })
}

async fn is_executable(locator: &Arc<dyn ExecutableLocator>, path: &str) -> bool {
    let locator = Arc::clone(locator);
    let path = path.to_string();
    tokio::task::spawn_blocking(move || locator.is_executable(&path))
        .await
        .unwrap_or(false)
}
