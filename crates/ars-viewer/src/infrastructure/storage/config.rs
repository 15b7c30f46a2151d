//! TOML-based configuration for the viewer.
//!
//! The file is read once at startup.  Every field is optional; a missing
//! file or a missing field falls back to the defaults below.
//!
//! ```toml
//! log_level = "info"
//!
//! [channel]
//! executable = "adb"
//! serial = "emulator-5554"   # optional preferred device
//! command_timeout_ms = 10000
//!
//! [capture]
//! strategy = "shell-exec"    # or "framebuffer"
//! frame_delay_ms = 500
//! failure_threshold = 1
//!
//! [display]
//! width = 480
//! height = 800
//! scale_percent = 50
//! landscape = false
//! fit_to_surface = true
//!
//! [watcher]
//! poll_interval_ms = 5000
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent, so a config file written for an
//! older release keeps working after new settings are added.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ars_core::{GeometryPipeline, MirrorConfig, Orientation};

use crate::application::capture_transport::CaptureStrategy;
use crate::application::frame_loop::FrameLoopConfig;

/// File name used when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "ars.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub watcher: WatcherConfig,
}

/// How to reach the control channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelConfig {
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Device to select on startup if it is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    /// `0` disables the timeout.
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

/// Frame capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    #[serde(default)]
    pub strategy: CaptureStrategy,
    #[serde(default = "default_frame_delay_ms")]
    pub frame_delay_ms: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
}

/// Initial display geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_scale_percent")]
    pub scale_percent: u32,
    #[serde(default)]
    pub landscape: bool,
    /// When `false`, `scale_percent` is forced even if the image outgrows
    /// the surface.
    #[serde(default = "default_true")]
    pub fit_to_surface: bool,
}

/// Device list polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatcherConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_executable() -> PathBuf {
    PathBuf::from("adb")
}
fn default_command_timeout_ms() -> u64 {
    10_000
}
fn default_frame_delay_ms() -> u64 {
    500
}
fn default_failure_threshold() -> u32 {
    1
}
fn default_width() -> u32 {
    480
}
fn default_height() -> u32 {
    800
}
fn default_scale_percent() -> u32 {
    50
}
fn default_true() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    5_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            channel: ChannelConfig::default(),
            capture: CaptureConfig::default(),
            display: DisplayConfig::default(),
            watcher: WatcherConfig::default(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            serial: None,
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            strategy: CaptureStrategy::default(),
            frame_delay_ms: default_frame_delay_ms(),
            failure_threshold: default_failure_threshold(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            scale_percent: default_scale_percent(),
            landscape: false,
            fit_to_surface: true,
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

// ── Projections ───────────────────────────────────────────────────────────────

impl AppConfig {
    /// The immutable settings the core is built from.
    pub fn mirror_config(&self) -> MirrorConfig {
        MirrorConfig {
            channel_path: self.channel.executable.clone(),
            frame_delay_ms: self.capture.frame_delay_ms,
            width: self.display.width,
            height: self.display.height,
            scale_percent: self.display.scale_percent,
        }
    }

    pub fn frame_loop_config(&self) -> FrameLoopConfig {
        FrameLoopConfig {
            frame_delay: Duration::from_millis(self.capture.frame_delay_ms),
            failure_threshold: self.capture.failure_threshold,
        }
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        (self.channel.command_timeout_ms > 0)
            .then(|| Duration::from_millis(self.channel.command_timeout_ms))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.watcher.poll_interval_ms)
    }

    /// A geometry pipeline sized for the initial surface, with the expected
    /// native size already configured.
    pub fn geometry_pipeline(&self) -> GeometryPipeline {
        let mirror = self.mirror_config();
        let (w, h) = mirror.surface_size();
        let orientation = if self.display.landscape {
            Orientation::Rotated90
        } else {
            Orientation::Normal
        };
        let user_scale = (!self.display.fit_to_surface).then(|| mirror.scale_factor());
        let mut pipeline = GeometryPipeline::new(w, h)
            .with_orientation(orientation)
            .with_user_scale(user_scale);
        pipeline.configure_native(mirror.width, mirror.height);
        pipeline
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
