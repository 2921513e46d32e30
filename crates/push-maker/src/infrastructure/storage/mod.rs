//! JSON file persistence for presets and settings.
//!
//! Both stores keep a whole document in one pretty-printed JSON file under
//! the per-user data directory:
//!
//! - `pushes.json`   – array of saved [`PushPayload`](push_core::PushPayload)s
//! - `settings.json` – one [`AppSettings`](push_core::AppSettings) object
//!
//! Every change rewrites the whole file.  A per-store async mutex serialises
//! read-modify-write sequences inside this process; nothing guards against
//! other processes editing the same files.

pub mod json_document;
pub mod paths;
pub mod presets;
pub mod settings;

pub use json_document::{JsonDocument, StoreError};
pub use paths::StoragePaths;
pub use presets::JsonPresetStore;
pub use settings::JsonSettingsStore;
