//! The capture contract shared by both screenshot strategies.
//!
//! The frame loop only ever sees `Arc<dyn CaptureTransport>`; which strategy
//! sits behind it is decided once, when the session is built.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use ars_core::{MirrorError, RawFrame};

/// Obtains one frame from the current target.
///
/// Implementations perform no retries.  Every failure is returned to the
/// caller as a typed [`MirrorError`].
#[async_trait]
pub trait CaptureTransport: Send + Sync {
    /// Captures a single, freshly allocated frame.
    async fn capture(&self) -> Result<RawFrame, MirrorError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Which capture strategy a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureStrategy {
    /// `screencap` over `exec-out`, decoded from the binary record.
    Framebuffer,
    /// `screencap -p` over `shell`, sanitized and PNG-decoded.
    #[default]
    ShellExec,
}
