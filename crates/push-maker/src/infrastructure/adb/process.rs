//! Running one external command with a bounded wait.
//!
//! # How the wait works (for beginners)
//!
//! The child's stdout and stderr are read on their own tasks while this task
//! waits for the exit status.  Reading concurrently matters: a child that
//! fills its pipe buffer blocks until someone drains it, so waiting first and
//! reading afterwards could deadlock on chatty output.
//!
//! The timeout covers both the wait and draining the pipes.  If it expires
//! the child is killed explicitly and [`ProcessError::Timeout`] is returned.  No exit code is reported for a
//! process that did not finish.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use super::config::DEFAULT_COMMAND_TIMEOUT;

/// Cap on captured bytes per stream.
const MAX_OUTPUT_BYTES: u64 = 4 * 1024 * 1024;

/// Exit status and trimmed output of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Why a command produced no [`ProcessOutput`].
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("no command to run")]
    EmptyCommand,

    /// The executable is missing, not executable, or the OS refused to start it.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
}

/// Executes an argument vector (`argv[0]` is the program).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, argv: Vec<String>) -> Result<ProcessOutput, ProcessError>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_COMMAND_TIMEOUT)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: Vec<String>) -> Result<ProcessOutput, ProcessError> {
        let (program, args) = argv.split_first().ok_or(ProcessError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %program, args = ?args, "spawning process");
        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let stderr_task = tokio::spawn(read_stream(child.stderr.take()));
        let readers = [stdout_task.abort_handle(), stderr_task.abort_handle()];

        // A grandchild that inherits the pipes keeps them open after the
        // child exits, so the drain shares the deadline with the wait.
        let finished = tokio::time::timeout(self.timeout, async {
            let status = child.wait().await?;
            let (stdout, stderr) = tokio::join!(stdout_task, stderr_task);
            Ok::<_, std::io::Error>((status, stdout.unwrap_or_default(), stderr.unwrap_or_default()))
        })
        .await;

        match finished {
            Ok(Ok((status, stdout, stderr))) => {
                let exit_code = status.code().unwrap_or(-1);
                debug!(program = %program, exit_code, "process exited");
                Ok(ProcessOutput {
                    exit_code,
                    stdout: String::from_utf8_lossy(&stdout).trim().to_string(),
                    stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
                })
            }
            Ok(Err(source)) => Err(ProcessError::Wait {
                program: program.clone(),
                source,
            }),
            Err(_elapsed) => {
                warn!(program = %program, timeout = ?self.timeout, "process timed out, killing it");
                if let Ok(None) = child.try_wait() {
                    if let Err(e) = child.kill().await {
                        warn!(program = %program, error = %e, "failed to kill timed out process");
                    }
                }
                for reader in readers {
                    reader.abort();
                }
                Err(ProcessError::Timeout {
                    program: program.clone(),
                    timeout: self.timeout,
                })
            }
        }
    }
}

/// Captures up to [`MAX_OUTPUT_BYTES`], then discards the rest so the child
/// never blocks on a full pipe.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut h) = handle else {
        return buf;
    };
    if let Err(e) = (&mut h).take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await {
        warn!(error = %e, "failed reading process output");
        return buf;
    }
    match tokio::io::copy(&mut h, &mut tokio::io::sink()).await {
        Ok(0) => {}
        Ok(dropped) => warn!(dropped, limit = MAX_OUTPUT_BYTES, "process output truncated"),
        Err(e) => warn!(error = %e, "failed draining process output"),
    }
    buf
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_run_captures_separate_trimmed_streams_and_exit_code() {
        // Arrange
        let runner = ProcessRunner::default();

        // Act
        let output = runner
            .run(argv(&["sh", "-c", "echo '  out  '; echo err 1>&2; exit 3"]))
            .await
            .unwrap();

        // Assert
        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_executable_is_a_spawn_error() {
        let runner = ProcessRunner::default();
        let err = runner
            .run(argv(&["/definitely/not/here/adb", "devices"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }), "{err}");
        assert!(err.to_string().contains("/definitely/not/here/adb"));
    }

    #[tokio::test]
    async fn test_slow_process_times_out() {
        let runner = ProcessRunner::new(Duration::from_millis(100));
        let err = runner.run(argv(&["sleep", "5"])).await.unwrap_err();
        assert!(matches!(err, ProcessError::Timeout { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_background_grandchild_holding_pipes_times_out() {
        // Arrange
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let started = std::time::Instant::now();

        // Act
        let result = runner
            .run(argv(&["sh", "-c", "sleep 5 & echo started"]))
            .await;

        // Assert
        assert!(
            matches!(result, Err(ProcessError::Timeout { .. })),
            "{result:?}"
        );
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_output_beyond_cap_is_drained_not_blocking() {
        // Arrange
        let runner = ProcessRunner::new(Duration::from_secs(10));

        // Act
        let output = runner
            .run(argv(&["sh", "-c", "head -c 5000000 /dev/zero; echo done 1>&2"]))
            .await
            .unwrap();

        // Assert
        assert!(output.success());
        assert_eq!(output.stdout.len(), MAX_OUTPUT_BYTES as usize);
        assert_eq!(output.stderr, "done");
    }

    #[tokio::test]
    async fn test_empty_argv_is_rejected() {
        let runner = ProcessRunner::default();
        let err = runner.run(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ProcessError::EmptyCommand));
    }
}
