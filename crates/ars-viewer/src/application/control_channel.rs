//! ControlChannel: the session's handle on the device-control process.
//!
//! The channel is a black box that accepts argument vectors and returns
//! bytes.  [`ChannelBackend`] is that black box; [`ControlChannel`] wraps it
//! with the one piece of mutable session state every caller shares: the
//! selected target device.
//!
//! # Target selection
//!
//! The target lives in a single `RwLock<Option<Device>>`.  The UI is the only
//! writer.  Every shell call takes a snapshot of the slot once at the start,
//! so a device deselected mid-call either completes against the old serial
//! or fails with [`MirrorError::NoTargetSelected`]; it never sees a
//! half-written value.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use ars_core::{protocol::devices::parse_device_list, Device, DeviceSet, MirrorError, ShellCommand};

/// Executes one invocation of the control channel process.
///
/// Implementations own process spawning, timeouts and stderr handling.
/// They never interpret the arguments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelBackend: Send + Sync {
    /// Runs the channel with `args` and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Channel`] if the process cannot be spawned,
    /// exits unsuccessfully, or times out.
    async fn execute(&self, args: Vec<String>) -> Result<Vec<u8>, MirrorError>;
}

/// Session-scoped access to the control channel.
pub struct ControlChannel {
    backend: Arc<dyn ChannelBackend>,
    target: RwLock<Option<Device>>,
}

impl ControlChannel {
    /// Creates a channel with no target selected.
    pub fn new(backend: Arc<dyn ChannelBackend>) -> Self {
        Self {
            backend,
            target: RwLock::new(None),
        }
    }

    /// Binds `device` as the target, superseding any previous one.  Passing
    /// `None` clears the selection.  No I/O is performed.
    pub fn select_target(&self, device: Option<Device>) {
        let mut slot = self.target.write().unwrap_or_else(PoisonError::into_inner);
        if *slot != device {
            debug!(previous = ?*slot, next = ?device, "target device changed");
        }
        *slot = device;
    }

    /// Snapshot of the current target.
    pub fn target(&self) -> Option<Device> {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Enumerates attached devices, degrading to an empty set on failure.
    pub async fn list_devices(&self) -> DeviceSet {
        match self.try_list_devices().await {
            Ok(set) => set,
            Err(e) => {
                warn!("device enumeration failed: {e}");
                DeviceSet::empty()
            }
        }
    }

    /// Enumerates attached devices, reporting channel failures.
    pub async fn try_list_devices(&self) -> Result<DeviceSet, MirrorError> {
        let stdout = self.backend.execute(vec!["devices".to_string()]).await?;
        Ok(parse_device_list(&String::from_utf8_lossy(&stdout)))
    }

    /// Runs `command` through `adb shell` on the current target.
    ///
    /// The output passes through the device's pseudo-terminal and may carry
    /// line-ending corruption.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::NoTargetSelected`] without spawning anything if
    /// no device is bound, or [`MirrorError::Channel`] on process failure.
    pub async fn run_shell_command(&self, command: &str) -> Result<Vec<u8>, MirrorError> {
        let device = self.require_target(command)?;
        self.shell_on(&device, command).await
    }

    /// Runs `command` through `adb shell` on an explicit device.
    pub async fn shell_on(&self, device: &Device, command: &str) -> Result<Vec<u8>, MirrorError> {
        debug!(device = %device, "shell: {command}");
        self.backend
            .execute(device_args(device, "shell", command))
            .await
    }

    /// Runs `command` through `adb exec-out` on the current target.  The
    /// output is binary clean.
    pub async fn exec_out(&self, command: &str) -> Result<Vec<u8>, MirrorError> {
        let device = self.require_target(command)?;
        debug!(device = %device, "exec-out: {command}");
        self.backend
            .execute(device_args(&device, "exec-out", command))
            .await
    }

    /// Formats and sends a command whose output is not needed.
    pub async fn send(&self, command: &ShellCommand) -> Result<(), MirrorError> {
        self.run_shell_command(&command.to_string()).await.map(drop)
    }

    /// Writes a PNG screenshot to `remote_path` on the device itself.
    pub async fn capture_to_device_file(&self, remote_path: &str) -> Result<(), MirrorError> {
        self.send(&ShellCommand::ScreencapToFile(remote_path.to_string()))
            .await
    }

    fn require_target(&self, command: &str) -> Result<Device, MirrorError> {
        self.target().ok_or_else(|| {
            error!("no target device selected; dropping `{command}`");
            MirrorError::NoTargetSelected
        })
    }
}

/// Picks the device a session should target: `preferred` if it is
/// attached, otherwise the first reported device.
pub fn choose_target(devices: &DeviceSet, preferred: Option<&str>) -> Option<Device> {
    preferred
        .and_then(|serial| devices.find(serial))
        .or_else(|| devices.first())
        .cloned()
}

fn device_args(device: &Device, mode: &str, command: &str) -> Vec<String> {
    vec![
        "-s".to_string(),
        device.serial().to_string(),
        mode.to_string(),
        command.to_string(),
    ]
}
