//! FrameLoop: the paced capture worker.
//!
//! # State machine
//!
//! ```text
//!          start()               stop()              worker exits
//!   Idle ──────────► Running ──────────► Stopping ──────────────► Idle
//!                       │
//!                       │ capture failed `failure_threshold` times in a row
//!                       ▼
//!                     Error ──── Stopped{reason} sent to surface ───► Idle
//! ```
//!
//! `start()` is accepted from both `Idle` and `Error`, so a surface may
//! restart the loop as soon as it receives `Stopped`.
//!
//! # One cycle (for beginners)
//!
//! 1. Sleep `frame_delay`, racing the sleep against the cancellation token.
//! 2. Ask the [`CaptureTransport`] for a frame.  This call is not raced
//!    against cancellation: an unresponsive channel delays `stop()` by at
//!    most one capture call.
//! 3. Feed the frame through the shared [`GeometryPipeline`] and rotate it
//!    if the view is in landscape.
//! 4. Overwrite the single-slot mailbox (a `tokio::sync::watch` channel).
//!    An unconsumed older frame is simply replaced.
//! 5. Post [`SurfaceEvent::Redraw`] and wait for the surface to acknowledge
//!    it.  Waiting here is what throttles capture to the UI's pace.
//!
//! Nothing is retried automatically after the loop gives up.  The owner
//! restarts it explicitly with [`FrameLoop::start`] or [`FrameLoop::resume`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ars_core::{DisplayGeometry, ErrorKind, GeometryPipeline, MirrorError, RawFrame};

use crate::application::capture_transport::CaptureTransport;
use crate::application::surface::{SurfaceEvent, SurfaceSender};

/// Geometry state shared by the frame loop (writer) and the input
/// dispatcher (reader).
pub type SharedGeometry = Arc<Mutex<GeometryPipeline>>;

/// Reader side of the single-slot frame mailbox.
pub type FrameMailbox = watch::Receiver<Option<Arc<RenderFrame>>>;

/// Lifecycle of the capture worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Error,
}

/// Tuning for the capture worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLoopConfig {
    /// Pause before every capture.
    pub frame_delay: Duration,
    /// Consecutive failures of the same kind that end the session.
    pub failure_threshold: u32,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_delay: Duration::from_millis(500),
            failure_threshold: 1,
        }
    }
}

/// A frame ready to paint: already rotated, with the geometry it was
/// rotated under.
#[derive(Debug)]
pub struct RenderFrame {
    pub frame: RawFrame,
    pub geometry: DisplayGeometry,
    /// Monotonic per-session frame counter, starting at 1.
    pub sequence: u64,
}

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Why a worker left its loop.
enum Exit {
    Cancelled,
    Failed(MirrorError),
    SurfaceClosed,
}

/// Everything the spawned worker needs, cloned out of the [`FrameLoop`].
#[derive(Clone)]
struct WorkerContext {
    transport: Arc<dyn CaptureTransport>,
    geometry: SharedGeometry,
    surface: SurfaceSender,
    config: FrameLoopConfig,
    mailbox: Arc<watch::Sender<Option<Arc<RenderFrame>>>>,
    state: Arc<watch::Sender<LoopState>>,
    last_error: Arc<Mutex<Option<MirrorError>>>,
}

/// The capture worker of one mirroring session.
pub struct FrameLoop {
    ctx: WorkerContext,
    paused: AtomicBool,
    worker: Mutex<Option<Worker>>,
}

impl FrameLoop {
    /// Creates an idle loop.  Nothing runs until [`FrameLoop::start`].
    pub fn new(
        transport: Arc<dyn CaptureTransport>,
        geometry: SharedGeometry,
        surface: SurfaceSender,
        config: FrameLoopConfig,
    ) -> Self {
        let (mailbox, _) = watch::channel(None);
        let (state, _) = watch::channel(LoopState::Idle);
        Self {
            ctx: WorkerContext {
                transport,
                geometry,
                surface,
                config,
                mailbox: Arc::new(mailbox),
                state: Arc::new(state),
                last_error: Arc::new(Mutex::new(None)),
            },
            paused: AtomicBool::new(false),
            worker: Mutex::new(None),
        }
    }

    /// Spawns the capture worker on the current Tokio runtime.
    ///
    /// Returns `false` without doing anything if the loop is already
    /// running, is still stopping, or is paused.
    pub fn start(&self) -> bool {
        if self.is_paused() {
            debug!("frame loop paused; start ignored");
            return false;
        }

        let mut slot = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(self.state(), LoopState::Running | LoopState::Stopping) {
            debug!("frame loop already running; start ignored");
            return false;
        }
        // A worker that reported `Error` may still be unwinding.  Its outcome
        // is already published, so the new session supersedes it.
        if let Some(stale) = slot.take() {
            stale.cancel.cancel();
        }

        *self
            .ctx
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.ctx.set_state(LoopState::Running);

        let cancel = CancellationToken::new();
        let ctx = self.ctx.clone();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            match ctx.run(&token).await {
                Exit::Cancelled => debug!("frame loop worker observed cancellation"),
                Exit::Failed(e) => ctx.fail(e, &token).await,
                Exit::SurfaceClosed => {
                    warn!("display surface closed; frame loop exiting");
                    ctx.set_state(LoopState::Idle);
                }
            }
        });
        *slot = Some(Worker { cancel, handle });
        true
    }

    /// Cancels the worker and waits for it to leave its loop.
    ///
    /// Idempotent.  Latency is bounded by one inter-frame delay plus one
    /// capture call.
    pub async fn stop(&self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(worker) = worker else {
            return;
        };

        if self.state() == LoopState::Running {
            self.ctx.set_state(LoopState::Stopping);
        }
        worker.cancel.cancel();
        if let Err(e) = worker.handle.await {
            error!("frame loop worker ended abnormally: {e}");
        }
        self.ctx.set_state(LoopState::Idle);
    }

    /// Pauses the session: stops the worker and makes `start()` a no-op.
    pub async fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.stop().await;
        info!("frame loop paused");
    }

    /// Clears the pause flag and starts the worker.
    pub fn resume(&self) -> bool {
        self.paused.store(false, Ordering::SeqCst);
        self.start()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> LoopState {
        *self.ctx.state.borrow()
    }

    /// Watches state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<LoopState> {
        self.ctx.state.subscribe()
    }

    /// A reader for the single-slot mailbox.
    pub fn mailbox(&self) -> FrameMailbox {
        self.ctx.mailbox.subscribe()
    }

    /// The most recently published frame, if any.
    pub fn latest_frame(&self) -> Option<Arc<RenderFrame>> {
        self.ctx.mailbox.borrow().clone()
    }

    /// The failure that ended the last session, if it ended in `Error`.
    pub fn last_error(&self) -> Option<MirrorError> {
        self.ctx
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl WorkerContext {
    fn set_state(&self, next: LoopState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            info!(?previous, ?next, "frame loop state changed");
        }
    }

    async fn run(&self, cancel: &CancellationToken) -> Exit {
        let threshold = self.config.failure_threshold.max(1);
        let mut failures: Option<(ErrorKind, u32)> = None;
        let mut sequence = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Exit::Cancelled,
                _ = tokio::time::sleep(self.config.frame_delay) => {}
            }

            let frame = match self.transport.capture().await {
                Ok(frame) => {
                    failures = None;
                    frame
                }
                Err(MirrorError::NoTargetSelected) => {
                    debug!("no target selected; skipping capture cycle");
                    continue;
                }
                Err(MirrorError::CancellationRequested) => return Exit::Cancelled,
                Err(e) => {
                    let count = match failures {
                        Some((kind, n)) if kind == e.kind() => n + 1,
                        _ => 1,
                    };
                    failures = Some((e.kind(), count));
                    if count >= threshold {
                        return Exit::Failed(e);
                    }
                    warn!(attempt = count, threshold, "capture via {} failed: {e}", self.transport.name());
                    continue;
                }
            };

            if cancel.is_cancelled() {
                return Exit::Cancelled;
            }

            sequence += 1;
            let render = {
                let mut pipeline = self.geometry.lock().unwrap_or_else(PoisonError::into_inner);
                let geometry = pipeline.update_from_frame(&frame);
                RenderFrame {
                    frame: pipeline.to_display_rotation(frame),
                    geometry,
                    sequence,
                }
            };
            debug!(
                sequence,
                width = render.frame.width(),
                height = render.frame.height(),
                "frame published"
            );
            self.mailbox.send_replace(Some(Arc::new(render)));

            let (ack, acked) = oneshot::channel();
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Exit::Cancelled,
                sent = self.surface.send(SurfaceEvent::Redraw { ack }) => {
                    if sent.is_err() {
                        return Exit::SurfaceClosed;
                    }
                }
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Exit::Cancelled,
                result = acked => {
                    if result.is_err() {
                        debug!(sequence, "redraw dropped without acknowledgement");
                    }
                }
            }
        }
    }

    async fn fail(&self, e: MirrorError, cancel: &CancellationToken) {
        error!("live mirroring stopped: {e}");
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = Some(e.clone());
        self.set_state(LoopState::Error);

        let stopped = SurfaceEvent::Stopped {
            reason: e.to_string(),
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {}
            _ = self.surface.send(stopped) => {}
        }
        // The surface may already have restarted the loop.
        let settled = self.state.send_if_modified(|state| {
            let errored = *state == LoopState::Error;
            if errored {
                *state = LoopState::Idle;
            }
            errored
        });
        if settled {
            info!(previous = ?LoopState::Error, next = ?LoopState::Idle, "frame loop state changed");
        }
    }
}
