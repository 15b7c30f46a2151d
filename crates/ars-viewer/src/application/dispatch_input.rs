//! InputDispatcher: pointer and key events on the mirrored image, replayed
//! on the device.
//!
//! Pointer coordinates arrive in display space and are mapped to device
//! pixels through the same [`GeometryPipeline`] the frame loop renders with.
//! A geometry change between the last paint and the event can misplace one
//! event; it never persists beyond one frame.

use std::sync::{Arc, PoisonError};
use std::time::Instant;

use tracing::debug;

use ars_core::{KeyMapper, MirrorError, ShellCommand, SymbolicKey};

use crate::application::control_channel::ControlChannel;
use crate::application::frame_loop::SharedGeometry;

/// Minimum displacement, in display pixels, on *each* axis for a drag to
/// count as a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 5.0;

/// A pointer position in display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, at: Instant) -> Self {
        Self { x, y, at }
    }

    /// An event stamped with the current instant.
    pub fn now(x: f64, y: f64) -> Self {
        Self::new(x, y, Instant::now())
    }
}

/// Translates display-space input into device shell commands.
pub struct InputDispatcher {
    channel: Arc<ControlChannel>,
    geometry: SharedGeometry,
    pressed: Option<PointerEvent>,
}

impl InputDispatcher {
    pub fn new(channel: Arc<ControlChannel>, geometry: SharedGeometry) -> Self {
        Self {
            channel,
            geometry,
            pressed: None,
        }
    }

    /// Sends a tap at a display-space point.
    ///
    /// Returns the command sent, or `None` if no geometry is known yet.
    ///
    /// # Errors
    ///
    /// Propagates [`MirrorError`] from the control channel.
    pub async fn on_tap(&self, x: f64, y: f64) -> Result<Option<ShellCommand>, MirrorError> {
        let Some((dx, dy)) = self.to_device(x, y) else {
            return Ok(None);
        };
        self.dispatch(ShellCommand::Tap { x: dx, y: dy }).await
    }

    /// Sends a swipe between two display-space points.
    ///
    /// Drags that do not move more than [`SWIPE_THRESHOLD_PX`] on both axes
    /// are ignored and return `None`.
    pub async fn on_swipe(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        duration_ms: u64,
    ) -> Result<Option<ShellCommand>, MirrorError> {
        if (x2 - x1).abs() <= SWIPE_THRESHOLD_PX || (y2 - y1).abs() <= SWIPE_THRESHOLD_PX {
            debug!("drag below swipe threshold ignored");
            return Ok(None);
        }
        let (Some((dx1, dy1)), Some((dx2, dy2))) = (self.to_device(x1, y1), self.to_device(x2, y2))
        else {
            return Ok(None);
        };
        self.dispatch(ShellCommand::Swipe {
            x1: dx1,
            y1: dy1,
            x2: dx2,
            y2: dy2,
            duration_ms,
        })
        .await
    }

    /// Records the start of a drag.
    pub fn on_press(&mut self, event: PointerEvent) {
        self.pressed = Some(event);
    }

    /// Ends a drag, sending a swipe whose duration is the time since the
    /// matching press.
    pub async fn on_release(&mut self, event: PointerEvent) -> Result<Option<ShellCommand>, MirrorError> {
        let Some(press) = self.pressed.take() else {
            return Ok(None);
        };
        let duration_ms = event.at.saturating_duration_since(press.at).as_millis() as u64;
        self.on_swipe(press.x, press.y, event.x, event.y, duration_ms)
            .await
    }

    /// Sends a key press.  Keys without an Android mapping are ignored.
    pub async fn on_key(&self, key: SymbolicKey) -> Result<Option<ShellCommand>, MirrorError> {
        match KeyMapper::to_android(key) {
            Some(code) => self.dispatch(ShellCommand::KeyEvent(code)).await,
            None => {
                debug!(?key, "unmapped key ignored");
                Ok(None)
            }
        }
    }

    fn to_device(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mapped = self
            .geometry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_device_coords(x, y);
        if mapped.is_none() {
            debug!("no display geometry yet; pointer event dropped");
        }
        mapped
    }

    async fn dispatch(&self, command: ShellCommand) -> Result<Option<ShellCommand>, MirrorError> {
        self.channel.send(&command).await?;
        Ok(Some(command))
    }
}
