//! Screenshot strategies and image file output.
//!
//! Both strategies implement
//! [`CaptureTransport`](crate::application::capture_transport::CaptureTransport)
//! and allocate a fresh [`RawFrame`](ars_core::RawFrame) per call.
//!
//! | Strategy            | Device command  | Channel mode | Post-processing        |
//! |---------------------|-----------------|--------------|------------------------|
//! | `FramebufferCapture`| `screencap`     | `exec-out`   | binary record decode   |
//! | `ShellExecCapture`  | `screencap -p`  | `shell`      | CR repair + PNG decode |

pub mod framebuffer;
pub mod shell_exec;
pub mod snapshot;

use std::sync::Arc;

use crate::application::capture_transport::{CaptureStrategy, CaptureTransport};
use crate::application::control_channel::ControlChannel;

pub use framebuffer::FramebufferCapture;
pub use shell_exec::ShellExecCapture;

/// Builds the transport for `strategy`.  Called once per session.
pub fn build_transport(
    strategy: CaptureStrategy,
    channel: Arc<ControlChannel>,
) -> Arc<dyn CaptureTransport> {
    match strategy {
        CaptureStrategy::Framebuffer => Arc::new(FramebufferCapture::new(channel)),
        CaptureStrategy::ShellExec => Arc::new(ShellExecCapture::new(channel)),
    }
}
