//! Shell-exec capture: `screencap -p` piped through `adb shell`.
//!
//! The shell transport may inject carriage returns, so the PNG stream is
//! repaired exactly once before it reaches the decoder.

use std::sync::Arc;

use async_trait::async_trait;
use image::ImageFormat;
use tracing::debug;

use ars_core::{protocol::sanitize::sanitize_in_place, MirrorError, RawFrame, ShellCommand};

use crate::application::capture_transport::CaptureTransport;
use crate::application::control_channel::ControlChannel;

/// Captures by running the on-device PNG screenshot command.
pub struct ShellExecCapture {
    channel: Arc<ControlChannel>,
}

impl ShellExecCapture {
    pub fn new(channel: Arc<ControlChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl CaptureTransport for ShellExecCapture {
    async fn capture(&self) -> Result<RawFrame, MirrorError> {
        let mut bytes = self
            .channel
            .run_shell_command(&ShellCommand::ScreencapPng.to_string())
            .await?;
        let corrected = sanitize_in_place(&mut bytes);
        debug!(len = bytes.len(), corrected, "png stream received");

        let image = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .map_err(|e| MirrorError::Decode(e.to_string()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(RawFrame::new(width, height, image.into_raw())?)
    }

    fn name(&self) -> &'static str {
        "shell-exec"
    }
}
