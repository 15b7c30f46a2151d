//! Android Remote Screen viewer: entry point.
//!
//! The binary wires the library together around a real `adb` process and
//! offers a handful of one-shot subcommands plus a headless live session.
//!
//! # Usage
//!
//! ```text
//! ars-viewer [--config ars.toml] [--serial SERIAL] <COMMAND>
//!
//! Commands:
//!   devices                          List attached device serials
//!   snapshot <OUT> [--on-device P]   Capture one frame to a PNG file
//!   tap <X> <Y>                      Tap at a display-space point
//!   swipe <X1> <Y1> <X2> <Y2>        Swipe between two display-space points
//!   key <NAME>                       Press a key (home, back, enter, a, 7, ...)
//!   mirror [--frames N]              Run a live mirroring session
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable     | Default    | Description                          |
//! |--------------|------------|--------------------------------------|
//! | `ARS_CONFIG` | `ars.toml` | Configuration file                   |
//! | `ARS_SERIAL` | (none)     | Preferred device, overrides the file |
//! | `RUST_LOG`   | (none)     | Log filter, overrides `log_level`    |
//!
//! # The `mirror` session (for beginners)
//!
//! There is no window here.  The main task plays the part of the UI thread:
//! it owns the receiving end of the surface channel, acknowledges every
//! redraw after "painting" (logging) the mailbox frame, and reacts to device
//! list changes by choosing a new target when the current one disappears.
//! Ctrl+C cancels both background workers and waits for them to exit.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ars_core::{ShellCommand, SymbolicKey};
use ars_viewer::application::control_channel::{choose_target, ControlChannel};
use ars_viewer::application::dispatch_input::InputDispatcher;
use ars_viewer::application::frame_loop::{FrameLoop, SharedGeometry};
use ars_viewer::application::surface::{surface_channel, SurfaceEvent};
use ars_viewer::application::watch_devices::DeviceWatcher;
use ars_viewer::infrastructure::adb::AdbBackend;
use ars_viewer::infrastructure::capture::{build_transport, snapshot::save_frame_png};
use ars_viewer::infrastructure::storage::config::{load_config, AppConfig, DEFAULT_CONFIG_FILE};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Mirror an Android device screen and forward input to it over adb.
#[derive(Debug, Parser)]
#[command(
    name = "ars-viewer",
    about = "Android screen mirroring and input forwarding over adb",
    version
)]
struct Cli {
    /// Path of the TOML configuration file.  A missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, env = "ARS_CONFIG")]
    config: PathBuf,

    /// Serial of the device to control.
    ///
    /// Falls back to `channel.serial` from the file, then to the first
    /// attached device.
    #[arg(long, env = "ARS_SERIAL")]
    serial: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the serials of attached devices.
    Devices,
    /// Capture one frame and write it as PNG.
    Snapshot {
        /// Local output file.
        output: PathBuf,
        /// Also write a PNG to this path on the device itself.
        #[arg(long)]
        on_device: Option<String>,
    },
    /// Tap at a display-space point.
    Tap { x: f64, y: f64 },
    /// Swipe between two display-space points.
    Swipe {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        /// Gesture duration in milliseconds.
        #[arg(long, default_value_t = 300)]
        duration: u64,
    },
    /// Press a named key.
    Key { name: SymbolicKey },
    /// Mirror the screen until Ctrl+C (or until `--frames` frames are shown).
    Mirror {
        #[arg(long)]
        frames: Option<u64>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    // RUST_LOG wins over the file's log_level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "ars-viewer {} starting (config: {})",
        env!("CARGO_PKG_VERSION"),
        cli.config.display()
    );

    let backend = Arc::new(
        AdbBackend::new(&config.channel.executable).with_timeout(config.command_timeout()),
    );
    if let Err(e) = backend.start_server().await {
        warn!("could not start the adb server: {e}");
    }
    let channel = Arc::new(ControlChannel::new(backend));

    if let Command::Devices = cli.command {
        let devices = channel
            .try_list_devices()
            .await
            .context("failed to list devices")?;
        for device in devices.iter() {
            println!("{device}");
        }
        return Ok(());
    }

    let preferred = cli.serial.or_else(|| config.channel.serial.clone());
    let devices = channel.list_devices().await;
    let target = choose_target(&devices, preferred.as_deref())
        .context("no device attached")?;
    info!(device = %target, "target selected");
    channel.select_target(Some(target));

    let geometry: SharedGeometry = Arc::new(Mutex::new(config.geometry_pipeline()));

    match cli.command {
        Command::Devices => Ok(()),
        Command::Snapshot { output, on_device } => {
            run_snapshot(&config, Arc::clone(&channel), output, on_device).await
        }
        Command::Tap { x, y } => {
            let dispatcher = InputDispatcher::new(channel, geometry);
            report(dispatcher.on_tap(x, y).await.context("tap failed")?);
            Ok(())
        }
        Command::Swipe {
            x1,
            y1,
            x2,
            y2,
            duration,
        } => {
            let dispatcher = InputDispatcher::new(channel, geometry);
            let sent = dispatcher
                .on_swipe(x1, y1, x2, y2, duration)
                .await
                .context("swipe failed")?;
            report(sent);
            Ok(())
        }
        Command::Key { name } => {
            let dispatcher = InputDispatcher::new(channel, geometry);
            report(dispatcher.on_key(name).await.context("key press failed")?);
            Ok(())
        }
        Command::Mirror { frames } => {
            run_mirror(&config, channel, geometry, preferred, frames).await
        }
    }
}

fn report(sent: Option<ShellCommand>) {
    match sent {
        Some(command) => println!("sent: {command}"),
        None => println!("ignored"),
    }
}

async fn run_snapshot(
    config: &AppConfig,
    channel: Arc<ControlChannel>,
    output: PathBuf,
    on_device: Option<String>,
) -> anyhow::Result<()> {
    if let Some(remote) = on_device {
        channel
            .capture_to_device_file(&remote)
            .await
            .with_context(|| format!("failed to write {remote} on the device"))?;
    }

    let transport = build_transport(config.capture.strategy, channel);
    let frame = transport
        .capture()
        .await
        .with_context(|| format!("{} capture failed", transport.name()))?;
    if !save_frame_png(&frame, &output) {
        anyhow::bail!("could not write {}", output.display());
    }
    println!("{}x{} -> {}", frame.width(), frame.height(), output.display());
    Ok(())
}

async fn run_mirror(
    config: &AppConfig,
    channel: Arc<ControlChannel>,
    geometry: SharedGeometry,
    preferred: Option<String>,
    max_frames: Option<u64>,
) -> anyhow::Result<()> {
    let (surface, mut events) = surface_channel();
    let transport = build_transport(config.capture.strategy, Arc::clone(&channel));
    let frame_loop = FrameLoop::new(
        transport,
        geometry,
        surface.clone(),
        config.frame_loop_config(),
    );
    let watcher = DeviceWatcher::new(Arc::clone(&channel), config.poll_interval());

    watcher.start(surface);
    frame_loop.start();
    let mailbox = frame_loop.mailbox();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut painted = 0u64;
    let mut outcome = Ok(());
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Ctrl+C received, stopping");
                break;
            }
            event = events.recv() => match event {
                None => break,
                Some(SurfaceEvent::Redraw { ack }) => {
                    if let Some(render) = mailbox.borrow().clone() {
                        let rect = render.geometry.target_rect();
                        info!(
                            sequence = render.sequence,
                            width = render.frame.width(),
                            height = render.frame.height(),
                            "frame painted into {rect:?}"
                        );
                    }
                    let _ = ack.send(());
                    painted += 1;
                    if max_frames.is_some_and(|limit| painted >= limit) {
                        break;
                    }
                }
                Some(SurfaceEvent::Stopped { reason }) => {
                    error!("mirroring stopped: {reason}");
                    outcome = Err(anyhow::anyhow!("mirroring stopped: {reason}"));
                    break;
                }
                Some(SurfaceEvent::DevicesChanged(devices)) => {
                    let still_attached = channel
                        .target()
                        .is_some_and(|current| devices.contains(&current));
                    if !still_attached {
                        let next = choose_target(&devices, preferred.as_deref());
                        match &next {
                            Some(device) => info!(device = %device, "switching target"),
                            None => warn!("no device attached; waiting"),
                        }
                        channel.select_target(next);
                    }
                }
            }
        }
    }

    frame_loop.stop().await;
    watcher.stop().await;
    info!(painted, "session ended");
    outcome
}
