//! Where PushMaker keeps its files.
//!
//! - Windows:  `%APPDATA%\PushMaker\`
//! - macOS:    `~/Library/Application Support/PushMaker/`
//! - Linux:    `$XDG_CONFIG_HOME/PushMaker/` or `~/.config/PushMaker/`

use std::path::{Path, PathBuf};

use super::json_document::StoreError;

/// Subdirectory created under the platform data root.
pub const APP_DIR_NAME: &str = "PushMaker";
pub const PUSHES_FILE_NAME: &str = "pushes.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Overrides the whole data directory.
pub const DATA_DIR_ENV_VAR: &str = "PUSHMAKER_DATA_DIR";

/// Resolved locations of the persisted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Uses `root` directly as the data directory.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The platform data directory joined with [`APP_DIR_NAME`].
    ///
    /// # Errors
    ///
    /// [`StoreError::NoPlatformDataDir`] when neither the platform variable
    /// nor a home directory is available.
    pub fn resolve() -> Result<Self, StoreError> {
        Self::resolve_with(env_path)
    }

    /// [`resolve`](Self::resolve) with environment lookups done by `var`.
    fn resolve_with(var: impl Fn(&str) -> Option<PathBuf>) -> Result<Self, StoreError> {
        platform_data_dir(var)
            .map(|dir| Self::at(dir.join(APP_DIR_NAME)))
            .ok_or(StoreError::NoPlatformDataDir)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pushes_file(&self) -> PathBuf {
        self.root.join(PUSHES_FILE_NAME)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE_NAME)
    }
}

fn platform_data_dir(var: impl Fn(&str) -> Option<PathBuf>) -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        var("APPDATA")
            .or_else(|| var("USERPROFILE").map(|home| home.join("AppData").join("Roaming")))
    }

    #[cfg(target_os = "macos")]
    {
        var("HOME").map(|home| home.join("Library").join("Application Support"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        var("XDG_CONFIG_HOME").or_else(|| var("HOME").map(|home| home.join(".config")))
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
