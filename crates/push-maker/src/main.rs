//! PushMaker: headless command-line front end.
//!
//! Composes push-notification test payloads and delivers them to Android
//! devices with `adb shell am broadcast`, sharing the presets and settings
//! files of the desktop app.
//!
//! # Usage
//!
//! ```text
//! push-maker [OPTIONS] <COMMAND>
//!
//! Commands:
//!   devices   List connected devices
//!   send      Broadcast a push to a device
//!   save      Save a push as a preset
//!   list      List saved presets, newest first
//!   show      Print one saved preset as JSON
//!   delete    Delete a saved preset
//!   adb-path  Show, detect, set, or clear the adb executable
//!
//! Options:
//!   --data-dir <DIR>        Directory holding pushes.json and settings.json
//!   --json                  Print {success, data, error} JSON
//!   --timeout <SECS>        adb command timeout [default: 15]
//!   --encoding <ENCODING>   json | extras [default: json]
//!   -v, --verbose           Debug logging
//! ```
//!
//! # Environment variables
//!
//! | Variable                | Description                                   |
//! |-------------------------|-----------------------------------------------|
//! | `PUSHMAKER_DATA_DIR`    | Same as `--data-dir`                          |
//! | `PUSHMAKER_ADB_TIMEOUT` | Same as `--timeout`                           |
//! | `ADB`                   | Explicit adb executable                       |
//! | `ANDROID_HOME`          | SDK root probed for `platform-tools/adb`      |
//! | `ANDROID_SDK_ROOT`      | SDK root probed for `platform-tools/adb`      |
//! | `RUST_LOG`              | Log filter (logs go to stderr)                |

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use push_core::{BroadcastEncoding, PushPriority};
use push_maker::infrastructure::adb::config::PLATFORM_TOOLS_DOWNLOAD_URL;
use push_maker::infrastructure::adb::AdbConfig;
use push_maker::infrastructure::storage::StoragePaths;
use push_maker::infrastructure::ui_bridge::{
    parse_key_value, AdbPathAction, CommandResult, PushDraft, Session,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Compose and send push-notification test payloads over adb.
#[derive(Debug, Parser)]
#[command(name = "push-maker", version)]
struct Cli {
    /// Directory holding `pushes.json` and `settings.json`.
    ///
    /// Defaults to the per-user application data directory.
    #[arg(long, env = "PUSHMAKER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Print results as `{success, data, error}` JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Seconds to wait for any adb command before killing it.
    #[arg(long, default_value_t = 15, env = "PUSHMAKER_ADB_TIMEOUT", global = true)]
    timeout: u64,

    /// How STRUCTURED payloads are passed to the receiver.
    #[arg(long, value_enum, default_value_t = EncodingArg::Json, global = true)]
    encoding: EncodingArg,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List connected devices.
    Devices,

    /// Broadcast a push to a device.
    Send {
        /// Device serial; defaults to the first connected device.
        #[arg(short, long)]
        device: Option<String>,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Save a push as a preset (updates it when --preset is given).
    Save {
        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// List saved presets, newest first.
    List,

    /// Print one saved preset as JSON.
    Show {
        /// Preset id or name.
        preset: String,
    },

    /// Delete a saved preset.
    Delete {
        /// Preset id or name.
        preset: String,
    },

    /// Show, detect, set, or clear the adb executable.
    AdbPath {
        /// Search the SDK locations and save the result.
        #[arg(long, conflicts_with_all = ["clear", "path"])]
        detect: bool,

        /// Forget the saved path and use adb from PATH.
        #[arg(long, conflicts_with = "path")]
        clear: bool,

        /// Executable to validate and save.
        path: Option<String>,
    },
}

#[derive(Debug, Args)]
struct PayloadArgs {
    /// Start from this saved preset (id or name).
    #[arg(long)]
    preset: Option<String>,

    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    body: Option<String>,

    /// Broadcast action [default: com.pushmaker.DEBUG_PUSH].
    #[arg(long)]
    action: Option<String>,

    /// Explicit receiver, e.g. `com.example/.DebugPushReceiver`.
    #[arg(long)]
    component: Option<String>,

    #[arg(long)]
    channel_id: Option<String>,

    #[arg(long)]
    collapse_key: Option<String>,

    #[arg(long)]
    icon: Option<String>,

    #[arg(long, value_enum)]
    priority: Option<PriorityArg>,

    /// Metadata entry, repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    metadata: Vec<(String, String)>,

    /// Data entry, repeatable.
    #[arg(long = "data", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    data: Vec<(String, String)>,

    /// Send this file's content as a raw JSON payload.
    #[arg(long)]
    raw_json_file: Option<PathBuf>,
}

impl From<PayloadArgs> for PushDraft {
    fn from(a: PayloadArgs) -> Self {
        Self {
            preset: a.preset,
            name: a.name,
            title: a.title,
            body: a.body,
            action: a.action,
            target_component: a.component,
            channel_id: a.channel_id,
            collapse_key: a.collapse_key,
            icon: a.icon,
            priority: a.priority.map(PushPriority::from),
            metadata: a.metadata,
            data: a.data,
            raw_json_file: a.raw_json_file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PriorityArg {
    Normal,
    High,
}

impl From<PriorityArg> for PushPriority {
    fn from(p: PriorityArg) -> Self {
        match p {
            PriorityArg::Normal => PushPriority::Normal,
            PriorityArg::High => PushPriority::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    /// One `payload` extra holding the JSON encoding.
    Json,
    /// One extra per field (`title`, `metadata.<key>`, ...).
    Extras,
}

impl Cli {
    fn adb_config(&self) -> AdbConfig {
        AdbConfig {
            executable: None,
            command_timeout: Duration::from_secs(self.timeout),
            encoding: match self.encoding {
                EncodingArg::Json => BroadcastEncoding::JsonPayload,
                EncodingArg::Extras => BroadcastEncoding::Extras,
            },
        }
    }

    fn storage_paths(&self) -> anyhow::Result<StoragePaths> {
        match &self.data_dir {
            Some(dir) => Ok(StoragePaths::at(dir)),
            None => StoragePaths::resolve().context("could not locate a data directory"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // Logs go to stderr so `--json` output on stdout stays machine-readable.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let paths = cli.storage_paths()?;
    debug!(data_dir = %paths.root().display(), "using data directory");
    let session = Session::open(&paths, cli.adb_config());
    let json = cli.json;

    let code = match cli.command {
        Command::Devices => emit(session.devices().await, json, |devices| {
            if devices.is_empty() {
                return "No ADB devices detected".to_string();
            }
            devices
                .iter()
                .map(|d| format!("{}\t{:?}\t{}", d.id, d.state, d.description))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::Send { device, payload } => {
            emit(session.send(device, payload.into()).await, json, String::clone)
        }
        Command::Save { payload } => emit(session.save(payload.into()).await, json, |p| {
            format!("Saved '{}' ({})", p.name, p.id)
        }),
        Command::List => emit(session.list().await, json, |presets| {
            presets
                .iter()
                .map(|p| format!("{}\t{}\t{}\t{}", p.id, p.updated_at, p.name, p.title))
                .collect::<Vec<_>>()
                .join("\n")
        }),
        Command::Show { preset } => emit(session.show(&preset).await, json, |p| {
            serde_json::to_string_pretty(p).unwrap_or_default()
        }),
        Command::Delete { preset } => emit(session.delete(&preset).await, json, |id| {
            format!("Deleted {id}")
        }),
        Command::AdbPath {
            detect,
            clear,
            path,
        } => {
            let action = match (detect, clear, path) {
                (true, _, _) => AdbPathAction::Detect,
                (_, true, _) => AdbPathAction::Clear,
                (_, _, Some(p)) => AdbPathAction::Set(p),
                _ => AdbPathAction::Show,
            };
            let result = session.adb_path(action).await;
            if !result.success && !json {
                eprintln!("Download platform-tools from {PLATFORM_TOOLS_DOWNLOAD_URL}");
            }
            emit(result, json, |s| match &s.adb_path {
                Some(p) => format!("adb: {p}"),
                None => format!("adb: {} (from PATH)", s.executable),
            })
        }
    };

    drop(session);
    info!("done");
    Ok(code)
}

/// Prints `result` as JSON or as text and maps it to an exit code.
fn emit<T: Serialize>(
    result: CommandResult<T>,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> ExitCode {
    let code = if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };
    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("failed to encode result: {e}"),
        }
        return code;
    }
    match (&result.data, &result.error) {
        (Some(data), _) => println!("{}", render(data)),
        (None, Some(error)) => eprintln!("{error}"),
        (None, None) => {}
    }
    code
}

// ── Tests ─────────────────────────────────────────────────────────────────────
