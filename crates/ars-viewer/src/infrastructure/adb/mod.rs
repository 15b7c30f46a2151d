//! Process-backed control channel.
//!
//! [`AdbBackend`] runs one `adb` process per call with `tokio::process`:
//!
//! ```text
//! adb devices
//! adb -s <serial> shell <command>
//! adb -s <serial> exec-out <command>
//! ```
//!
//! Standard output is returned as bytes.  Standard error is captured rather
//! than inherited; it becomes the error message when the process exits
//! unsuccessfully and is logged at debug level otherwise.

pub mod mock;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use ars_core::MirrorError;

use crate::application::control_channel::ChannelBackend;

/// Runs the `adb` executable.
#[derive(Debug, Clone)]
pub struct AdbBackend {
    executable: PathBuf,
    timeout: Option<Duration>,
}

impl AdbBackend {
    /// Uses `executable` (a bare name is looked up on `PATH`) with no timeout.
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
        }
    }

    /// Kills any invocation that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Starts the adb server so the first device poll does not race it.
    pub async fn start_server(&self) -> Result<(), MirrorError> {
        self.execute(vec!["start-server".to_string()]).await.map(drop)
    }
}

#[async_trait]
impl ChannelBackend for AdbBackend {
    async fn execute(&self, args: Vec<String>) -> Result<Vec<u8>, MirrorError> {
        let mut command = Command::new(&self.executable);
        command
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let label = format!("{} {}", self.executable.display(), args.join(" "));
        debug!("spawning `{label}`");

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    MirrorError::Channel(format!("`{label}` timed out after {} ms", limit.as_millis()))
                })?,
            None => command.output().await,
        }
        .map_err(|e| MirrorError::Channel(format!("failed to run `{label}`: {e}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if !output.status.success() {
            return Err(MirrorError::Channel(format!(
                "`{label}` exited with {}: {stderr}",
                output.status
            )));
        }
        if !stderr.is_empty() {
            debug!(stderr, "`{label}` wrote to stderr");
        }
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_execute_returns_stdout() {
        let backend = AdbBackend::new("echo");

        let out = backend.execute(args(&["devices"])).await.unwrap();

        assert_eq!(out, b"devices\n");
    }

    #[tokio::test]
    async fn test_missing_executable_is_channel_error() {
        let backend = AdbBackend::new("/nonexistent/ars-test/adb");

        let result = backend.execute(args(&["devices"])).await;

        assert!(matches!(result, Err(MirrorError::Channel(msg)) if msg.contains("failed to run")));
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_channel_error() {
        let backend = AdbBackend::new("false");

        let result = backend.execute(Vec::new()).await;

        assert!(matches!(result, Err(MirrorError::Channel(msg)) if msg.contains("exited with")));
    }

    #[tokio::test]
    async fn test_timeout_is_channel_error() {
        let backend = AdbBackend::new("sleep").with_timeout(Some(Duration::from_millis(50)));

        let result = backend.execute(args(&["5"])).await;

        assert!(matches!(result, Err(MirrorError::Channel(msg)) if msg.contains("timed out")));
    }
}
