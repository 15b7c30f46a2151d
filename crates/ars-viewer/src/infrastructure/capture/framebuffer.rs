//! Structured capture: the raw `screencap` record over `exec-out`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use ars_core::{protocol::framebuffer::decode_framebuffer, MirrorError, RawFrame, ShellCommand};

use crate::application::capture_transport::CaptureTransport;
use crate::application::control_channel::ControlChannel;

/// Captures by decoding the device's binary framebuffer record.
pub struct FramebufferCapture {
    channel: Arc<ControlChannel>,
}

impl FramebufferCapture {
    pub fn new(channel: Arc<ControlChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl CaptureTransport for FramebufferCapture {
    async fn capture(&self) -> Result<RawFrame, MirrorError> {
        let bytes = self
            .channel
            .exec_out(&ShellCommand::ScreencapRaw.to_string())
            .await?;
        debug!(len = bytes.len(), "framebuffer record received");
        Ok(decode_framebuffer(&bytes)?)
    }

    fn name(&self) -> &'static str {
        "framebuffer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adb::mock::ScriptedBackend;
    use ars_core::{
        protocol::framebuffer::{encode_framebuffer, PixelLayout},
        Device, ErrorKind,
    };

    fn capture_with(backend: ScriptedBackend) -> (FramebufferCapture, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        let channel = Arc::new(ControlChannel::new(backend.clone()));
        channel.select_target(Some(Device::new("emulator-5554")));
        (FramebufferCapture::new(channel), backend)
    }

    #[tokio::test]
    async fn test_capture_decodes_record_from_exec_out() {
        // Arrange
        let record = encode_framebuffer(2, 1, PixelLayout::Rgba8888, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let (capture, backend) =
            capture_with(ScriptedBackend::with_responder(move |_| Ok(record.clone())));

        // Act
        let frame = capture.capture().await.unwrap();

        // Assert
        assert_eq!((frame.width(), frame.height()), (2, 1));
        assert_eq!(
            backend.calls(),
            vec![vec!["-s", "emulator-5554", "exec-out", "screencap"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()]
        );
    }

    #[tokio::test]
    async fn test_truncated_record_is_decode_error() {
        let (capture, _) = capture_with(ScriptedBackend::with_responder(|_| Ok(vec![1, 2, 3])));

        let err = capture.capture().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_channel_failure_is_channel_error() {
        let (capture, backend) = capture_with(ScriptedBackend::new());
        backend.set_failing(true);

        let err = capture.capture().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Channel);
    }
}
