//! The error vocabulary shared by every mirroring component.
//!
//! Each component returns a [`MirrorError`] instead of terminating the
//! process.  Only the long-running workers (the frame loop and the device
//! watcher) decide whether an error ends the session or is absorbed.

use thiserror::Error;

use crate::domain::frame::FrameError;
use crate::protocol::framebuffer::FramebufferError;

/// Errors raised while talking to a device or decoding what it sent back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MirrorError {
    /// No device is bound as the current target.  Callers treat this as a
    /// no-op rather than a failure.
    #[error("no target device selected")]
    NoTargetSelected,

    /// The control channel process failed, timed out, or exited non-zero.
    #[error("control channel error: {0}")]
    Channel(String),

    /// The captured bytes were not a valid frame.
    #[error("failed to decode captured frame: {0}")]
    Decode(String),

    /// The worker observed cancellation and should leave its loop.
    #[error("cancellation requested")]
    CancellationRequested,
}

/// Discriminant of [`MirrorError`] without the payload, used to compare
/// consecutive failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoTargetSelected,
    Channel,
    Decode,
    CancellationRequested,
}

impl MirrorError {
    /// Returns the payload-free kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MirrorError::NoTargetSelected => ErrorKind::NoTargetSelected,
            MirrorError::Channel(_) => ErrorKind::Channel,
            MirrorError::Decode(_) => ErrorKind::Decode,
            MirrorError::CancellationRequested => ErrorKind::CancellationRequested,
        }
    }

    /// Returns `true` for errors that should end a live session.
    ///
    /// `NoTargetSelected` and `CancellationRequested` are control signals,
    /// not hard failures.
    pub fn is_hard_failure(&self) -> bool {
        matches!(self, MirrorError::Channel(_) | MirrorError::Decode(_))
    }
}

impl From<FramebufferError> for MirrorError {
    fn from(e: FramebufferError) -> Self {
        MirrorError::Decode(e.to_string())
    }
}

impl From<FrameError> for MirrorError {
    fn from(e: FrameError) -> Self {
        MirrorError::Decode(e.to_string())
    }
}
