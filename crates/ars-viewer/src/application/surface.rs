//! Messages from the workers to the thread that owns the display surface.
//!
//! The surface is single-threaded.  Workers never touch it directly; they
//! post a [`SurfaceEvent`] and, for redraws, wait for the surface to
//! acknowledge.  A slow surface therefore slows the capture rate instead of
//! piling up frames.

use tokio::sync::{mpsc, oneshot};

use ars_core::DeviceSet;

/// Capacity of the worker → surface queue.
pub const SURFACE_QUEUE_CAPACITY: usize = 16;

/// A request delivered to the surface owner.
#[derive(Debug)]
pub enum SurfaceEvent {
    /// A new frame is in the mailbox.  Send on `ack` once it is painted.
    Redraw { ack: oneshot::Sender<()> },
    /// Live mirroring ended because of a failure.
    Stopped { reason: String },
    /// The set of attached devices changed.
    DevicesChanged(DeviceSet),
}

/// Producer side held by the workers.
pub type SurfaceSender = mpsc::Sender<SurfaceEvent>;

/// Consumer side held by the surface owner.
pub type SurfaceReceiver = mpsc::Receiver<SurfaceEvent>;

/// Creates the bounded worker → surface queue.
pub fn surface_channel() -> (SurfaceSender, SurfaceReceiver) {
    mpsc::channel(SURFACE_QUEUE_CAPACITY)
}
