//! AdbClient: the [`DeviceBridge`] that shells out to adb.
//!
//! Device listing runs `adb devices -l` and parses its output with
//! [`push_core::parse_devices_output`].  Sending runs
//! `adb -s <device> shell am broadcast ...` with arguments produced by
//! [`push_core::broadcast_args`].
//!
//! The executable can be replaced at runtime with
//! [`set_executable`](DeviceBridge::set_executable); the next spawned command
//! uses the new value.

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use push_core::{broadcast_args, parse_devices_output, AdbDevice, BroadcastEncoding, PushPayload};
use tracing::{debug, warn};

use crate::application::ports::{CommandOutcome, DeviceBridge};

use super::config::{AdbConfig, ADB_ENV_VAR, DEFAULT_ADB_COMMAND};
use super::locator::{expand_tilde, home_dir};
use super::process::{CommandRunner, ProcessOutput, ProcessRunner};

/// Shown when a broadcast succeeds without printing anything.
const SENT_FALLBACK: &str = "Push broadcast sent";
/// Shown when a failed command produced no diagnostics at all.
const FAILED_FALLBACK: &str = "ADB command failed";

pub struct AdbClient {
    config: RwLock<AdbConfig>,
    runner: Arc<dyn CommandRunner>,
    /// `$ADB` captured at construction.
    env_executable: Option<String>,
    home: Option<PathBuf>,
}

impl AdbClient {
    /// Client that spawns real processes and honours `$ADB`.
    pub fn new(config: AdbConfig) -> Self {
        let runner = Arc::new(ProcessRunner::new(config.command_timeout));
        let env_executable = std::env::var(ADB_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Self::with_runner(config, runner, env_executable)
    }

    /// Client over an arbitrary runner; used by tests.
    pub fn with_runner(
        config: AdbConfig,
        runner: Arc<dyn CommandRunner>,
        env_executable: Option<String>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            runner,
            env_executable,
            home: home_dir(),
        }
    }

    pub fn encoding(&self) -> BroadcastEncoding {
        self.read_config().encoding
    }

    /// Override, then `$ADB`, then `adb` from PATH.
    fn resolve_executable(&self) -> String {
        let override_path = self.read_config().executable.clone();
        match override_path.or_else(|| self.env_executable.clone()) {
            Some(path) => expand_tilde(&path, self.home.as_deref())
                .display()
                .to_string(),
            None => DEFAULT_ADB_COMMAND.to_string(),
        }
    }

    // A poisoned lock still holds a valid config; keep using it.
    fn read_config(&self) -> RwLockReadGuard<'_, AdbConfig> {
        self.config.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, AdbConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl DeviceBridge for AdbClient {
    fn set_executable(&self, path: Option<String>) -> String {
        self.write_config().executable = path.filter(|p| !p.trim().is_empty());
        self.resolve_executable()
    }

    fn current_executable(&self) -> String {
        self.resolve_executable()
    }

    async fn list_devices(&self) -> Result<Vec<AdbDevice>, String> {
        let argv = vec![
            self.resolve_executable(),
            "devices".to_string(),
            "-l".to_string(),
        ];
        let output = self.runner.run(argv).await.map_err(|e| e.to_string())?;
        if !output.success() {
            return Err(failure_message(&output));
        }
        let devices = parse_devices_output(&output.stdout);
        debug!(count = devices.len(), "devices listed");
        Ok(devices)
    }

    async fn send_push(&self, device_id: &str, payload: &PushPayload) -> CommandOutcome {
        let mut argv = vec![self.resolve_executable()];
        argv.extend(broadcast_args(device_id, payload, self.encoding()));

        match self.runner.run(argv).await {
            Ok(output) if output.success() => {
                let message = if output.stdout.trim().is_empty() {
                    SENT_FALLBACK.to_string()
                } else {
                    output.stdout
                };
                CommandOutcome::Success(message)
            }
            Ok(output) => CommandOutcome::Failure(failure_message(&output)),
            Err(e) => {
                warn!(device = %device_id, error = %e, "could not run adb");
                CommandOutcome::Failure(e.to_string())
            }
        }
    }
}

/// Exit code line, then any stdout and stderr, newline-joined.
fn failure_message(output: &ProcessOutput) -> String {
    let mut lines = vec![format!("ADB exited with {}", output.exit_code)];
    for stream in [&output.stdout, &output.stderr] {
        if !stream.trim().is_empty() {
            lines.push(stream.clone());
        }
    }
    let message = lines.join("\n").trim().to_string();
    if message.is_empty() {
        FAILED_FALLBACK.to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adb::process::{MockCommandRunner, ProcessError};
    use push_core::{quote_for_shell, DeviceState, PayloadMode};

    fn strings(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn output(exit_code: i32, stdout: &str, stderr: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    fn client(runner: MockCommandRunner, executable: Option<&str>) -> AdbClient {
        let config = AdbConfig {
            executable: executable.map(str::to_string),
            ..AdbConfig::default()
        };
        AdbClient::with_runner(config, Arc::new(runner), None)
    }

    // ── Executable resolution ─────────────────────────────────────────────────

    #[test]
    fn test_executable_falls_back_from_override_to_env_to_path() {
        let c = AdbClient::with_runner(
            AdbConfig::default(),
            Arc::new(MockCommandRunner::new()),
            Some("/env/adb".to_string()),
        );
        assert_eq!(c.current_executable(), "/env/adb");
        assert_eq!(c.set_executable(Some("/opt/adb".to_string())), "/opt/adb");
        assert_eq!(c.current_executable(), "/opt/adb");
        assert_eq!(c.set_executable(None), "/env/adb");

        let bare = client(MockCommandRunner::new(), None);
        assert_eq!(bare.current_executable(), "adb");
        assert_eq!(bare.set_executable(Some("   ".to_string())), "adb");
    }

    // ── list_devices ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_devices_runs_devices_l_and_parses_output() {
        // Arrange
        let mut runner = MockCommandRunner::new();
        let expected = strings(&["/opt/adb", "devices", "-l"]);
        runner
            .expect_run()
            .withf(move |argv| *argv == expected)
            .times(1)
            .returning(|_| {
                Ok(output(
                    0,
                    "List of devices attached\n\
                     emulator-5554 device product:sdk model:Pixel_7\n\
                     R58N offline",
                    "",
                ))
            });

        // Act
        let devices = client(runner, Some("/opt/adb")).list_devices().await.unwrap();

        // Assert
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "emulator-5554");
        assert_eq!(devices[0].state, DeviceState::Online);
        assert_eq!(devices[0].description, "product:sdk model:Pixel_7");
        assert_eq!(devices[1].state, DeviceState::Offline);
    }

    #[tokio::test]
    async fn test_list_devices_surfaces_launch_failure_message() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Err(ProcessError::Spawn {
                program: "adb".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
            })
        });

        let err = client(runner, None).list_devices().await.unwrap_err();

        assert_eq!(err, "failed to start adb: No such file");
    }

    #[tokio::test]
    async fn test_list_devices_nonzero_exit_is_an_error() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(output(1, "", "daemon not running")));

        let err = client(runner, None).list_devices().await.unwrap_err();

        assert_eq!(err, "ADB exited with 1\ndaemon not running");
    }

    // ── send_push ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_send_push_builds_broadcast_command() {
        // Arrange
        let payload = PushPayload {
            title: "Hello".to_string(),
            target_component: "com.example/.Receiver".to_string(),
            ..PushPayload::default()
        };
        let mut expected = strings(&["/opt/adb"]);
        expected.extend(broadcast_args("emulator-5554", &payload, BroadcastEncoding::JsonPayload));
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |argv| *argv == expected)
            .times(1)
            .returning(|_| Ok(output(0, "Broadcast completed: result=0", "")));

        // Act
        let outcome = client(runner, Some("/opt/adb"))
            .send_push("emulator-5554", &payload)
            .await;

        // Assert
        assert_eq!(
            outcome,
            CommandOutcome::Success("Broadcast completed: result=0".to_string())
        );
    }

    #[tokio::test]
    async fn test_send_push_raw_json_is_quoted_payload_extra() {
        let payload = PushPayload {
            payload_mode: PayloadMode::RawJson,
            raw_json_payload: r#"{"msg":"it's here"}"#.to_string(),
            ..PushPayload::default()
        };
        let quoted = quote_for_shell(&payload.raw_json_payload);
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(move |argv| argv.ends_with(&["--es".to_string(), "payload".to_string(), quoted.clone()]))
            .returning(|_| Ok(output(0, "", "")));

        let outcome = client(runner, None).send_push("dev", &payload).await;

        assert_eq!(outcome, CommandOutcome::Success(SENT_FALLBACK.to_string()));
    }

    #[tokio::test]
    async fn test_send_push_nonzero_exit_composes_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(output(255, "partial", "error: device 'x' not found")));

        let outcome = client(runner, None)
            .send_push("x", &PushPayload::default())
            .await;

        assert_eq!(
            outcome,
            CommandOutcome::Failure(
                "ADB exited with 255\npartial\nerror: device 'x' not found".to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_send_push_timeout_is_a_failure_not_a_panic() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Err(ProcessError::Timeout {
                program: "adb".to_string(),
                timeout: std::time::Duration::from_secs(15),
            })
        });

        let outcome = client(runner, None)
            .send_push("dev", &PushPayload::default())
            .await;

        assert!(!outcome.is_success());
        assert!(outcome.message().contains("did not finish"));
    }

    #[test]
    fn test_failure_message_without_output_lists_exit_code() {
        assert_eq!(failure_message(&output(2, " ", "")), "ADB exited with 2");
    }
}
