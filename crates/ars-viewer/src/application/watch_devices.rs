//! DeviceWatcher: periodic diffing of the attached-device list.
//!
//! Every `interval` the watcher asks the control channel for the device
//! list and compares it, as an unordered set, with the previous snapshot.
//! Any difference replaces the snapshot and is posted to the surface as
//! [`SurfaceEvent::DevicesChanged`].  The very first poll always reports,
//! so the UI learns the initial list.
//!
//! A failed poll reads as "no devices" (see
//! [`ControlChannel::list_devices`]); the watcher itself never stops on a
//! channel error.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use ars_core::DeviceSet;

use crate::application::control_channel::ControlChannel;
use crate::application::surface::{SurfaceEvent, SurfaceSender};

/// Default pause between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Remembers the last reported snapshot and decides whether a new one is a
/// change.
#[derive(Debug, Default)]
pub struct DeviceSetTracker {
    last: Option<DeviceSet>,
}

impl DeviceSetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tracker that has already reported `set`.
    pub fn primed(set: DeviceSet) -> Self {
        Self { last: Some(set) }
    }

    /// Returns `Some(next)` if `next` differs from the last snapshot as a
    /// set, remembering it; `None` otherwise.
    pub fn observe(&mut self, next: DeviceSet) -> Option<DeviceSet> {
        match &self.last {
            Some(previous) if previous.same_members(&next) => None,
            _ => {
                self.last = Some(next.clone());
                Some(next)
            }
        }
    }

    pub fn current(&self) -> Option<&DeviceSet> {
        self.last.as_ref()
    }
}

/// Background poller of the device list.
pub struct DeviceWatcher {
    channel: Arc<ControlChannel>,
    interval: Duration,
    worker: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl DeviceWatcher {
    pub fn new(channel: Arc<ControlChannel>, interval: Duration) -> Self {
        Self {
            channel,
            interval,
            worker: Mutex::new(None),
        }
    }

    /// Spawns the poll worker, posting changes to `events`.
    ///
    /// Returns `false` if a worker is already running.
    pub fn start(&self, events: SurfaceSender) -> bool {
        let mut slot = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(slot.as_ref(), Some((_, handle)) if !handle.is_finished()) {
            return false;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let channel = Arc::clone(&self.channel);
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            poll_loop(channel, interval, events, token).await;
        });
        *slot = Some((cancel, handle));
        info!(interval_ms = self.interval.as_millis() as u64, "device watcher started");
        true
    }

    /// Stops the poll worker.  Safe to call any number of times.
    pub async fn stop(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((cancel, handle)) = worker {
            cancel.cancel();
            if let Err(e) = handle.await {
                error!("device watcher worker ended abnormally: {e}");
            }
            info!("device watcher stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

async fn poll_loop(
    channel: Arc<ControlChannel>,
    interval: Duration,
    events: SurfaceSender,
    cancel: CancellationToken,
) {
    let mut tracker = DeviceSetTracker::new();
    loop {
        if cancel.is_cancelled() {
            break;
        }

        let snapshot = channel.list_devices().await;
        match tracker.observe(snapshot) {
            Some(changed) => {
                info!(count = changed.len(), "attached devices changed");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = events.send(SurfaceEvent::DevicesChanged(changed)) => {
                        if sent.is_err() {
                            debug!("surface closed; device watcher exiting");
                            break;
                        }
                    }
                }
            }
            None => debug!("device list unchanged"),
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}
