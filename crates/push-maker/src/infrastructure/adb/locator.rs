//! Finding a usable adb executable on disk.
//!
//! # Search order
//!
//! 1. `$ADB`, with a leading `~` expanded to the home directory.
//! 2. For each SDK root (`$ANDROID_HOME`, `$ANDROID_SDK_ROOT`, then the usual
//!    install locations), `<root>/platform-tools/<adb>` and then `<root>/<adb>`.
//!
//! Default install locations probed:
//!
//! | Platform | Location                                      |
//! |----------|-----------------------------------------------|
//! | macOS    | `~/Library/Android/sdk`                       |
//! | Linux    | `~/Android/Sdk`, `~/Android/sdk`              |
//! | Windows  | `%LOCALAPPDATA%\Android\Sdk`                  |
//! | Windows  | `%ProgramFiles%\Android\Android Studio`       |
//!
//! Not finding anything is a normal outcome (`None`), not an error.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::application::ports::ExecutableLocator;

use super::config::ADB_ENV_VAR;

/// Name of the adb binary on this platform.
#[cfg(windows)]
pub const ADB_BINARY_NAME: &str = "adb.exe";
#[cfg(not(windows))]
pub const ADB_BINARY_NAME: &str = "adb";

/// Environment snapshot used by the search.  Blank variables count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorEnv {
    pub adb: Option<String>,
    pub android_home: Option<String>,
    pub android_sdk_root: Option<String>,
    pub home: Option<PathBuf>,
    pub local_app_data: Option<String>,
    pub program_files: Option<String>,
}

impl LocatorEnv {
    /// Reads the relevant variables from the current process.
    pub fn from_process() -> Self {
        Self {
            adb: env_var(ADB_ENV_VAR),
            android_home: env_var("ANDROID_HOME"),
            android_sdk_root: env_var("ANDROID_SDK_ROOT"),
            home: home_dir(),
            local_app_data: env_var("LOCALAPPDATA"),
            program_files: env_var("ProgramFiles"),
        }
    }
}

/// [`ExecutableLocator`] over the filesystem.
#[derive(Debug, Clone)]
pub struct AdbLocator {
    env: LocatorEnv,
    binary_name: String,
}

impl AdbLocator {
    pub fn new(env: LocatorEnv) -> Self {
        Self {
            env,
            binary_name: ADB_BINARY_NAME.to_string(),
        }
    }

    pub fn from_process_env() -> Self {
        Self::new(LocatorEnv::from_process())
    }

    /// SDK roots in probe order.
    pub fn sdk_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = [&self.env.android_home, &self.env.android_sdk_root]
            .into_iter()
            .flatten()
            .map(|root| self.expand(root))
            .collect();

        if let Some(home) = &self.env.home {
            roots.push(home.join("Library").join("Android").join("sdk"));
            roots.push(home.join("Android").join("Sdk"));
            roots.push(home.join("Android").join("sdk"));
        }
        let local_app_data = match &self.env.local_app_data {
            Some(dir) => Some(PathBuf::from(dir)),
            None => self.env.home.as_ref().map(|h| h.join("AppData").join("Local")),
        };
        if let Some(dir) = local_app_data {
            roots.push(dir.join("Android").join("Sdk"));
        }
        if let Some(dir) = &self.env.program_files {
            roots.push(PathBuf::from(dir).join("Android").join("Android Studio"));
        }
        roots
    }

    fn expand(&self, path: &str) -> PathBuf {
        expand_tilde(path, self.env.home.as_deref())
    }
}

impl ExecutableLocator for AdbLocator {
    fn detect(&self) -> Option<String> {
        if let Some(direct) = &self.env.adb {
            let expanded = self.expand(direct);
            if is_executable_file(&expanded) {
                debug!(path = %expanded.display(), "adb found via {}", ADB_ENV_VAR);
                return Some(expanded.display().to_string());
            }
        }

        for root in self.sdk_roots() {
            for candidate in [
                root.join("platform-tools").join(&self.binary_name),
                root.join(&self.binary_name),
            ] {
                if is_executable_file(&candidate) {
                    debug!(path = %candidate.display(), "adb found in SDK root");
                    return Some(candidate.display().to_string());
                }
            }
        }
        debug!("no adb executable found");
        None
    }

    fn is_executable(&self, path: &str) -> bool {
        is_executable_file(&self.expand(path))
    }
}

/// Expands a leading `~` (alone or followed by a separator) to `home`.
pub fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return PathBuf::from(path);
    };
    if path == "~" {
        return home.to_path_buf();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Home directory from `HOME`, or `USERPROFILE` on Windows.
pub fn home_dir() -> Option<PathBuf> {
    env_var("HOME")
        .or_else(|| env_var("USERPROFILE"))
        .map(PathBuf::from)
}

/// Existing regular file with an execute bit (any file on Windows).
pub fn is_executable_file(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
