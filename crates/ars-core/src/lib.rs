//! # ars-core
//!
//! Shared library for Android Remote Screen containing the device domain,
//! frame geometry, the shell command vocabulary, and the decoders that turn
//! captured bytes into pixels.
//!
//! It has zero dependencies on OS processes, UI toolkits, or async runtimes.
//! Everything here is pure and deterministic, which is what lets the viewer
//! crate test its capture and input paths against scripted channels.
//!
//! # Architecture overview (for beginners)
//!
//! Android Remote Screen mirrors the screen of a phone attached through a
//! *control channel* (the `adb` tool) and sends taps, swipes and key presses
//! back to it.  The channel only understands two things: command strings and
//! raw bytes.  This crate owns both ends of that conversation:
//!
//! - **`protocol`** – How commands are spelled (`input tap 120.0 340.5`), how
//!   the device list text is parsed, how a text-mode transport's line ending
//!   corruption is undone, and how the binary `screencap` record is decoded.
//!
//! - **`domain`** – Devices, frames, and the `GeometryPipeline` that maps
//!   between device pixels and the (possibly rotated, usually scaled-down)
//!   pixels the user sees.
//!
//! - **`keymap`** – Translation from host keys to Android key codes.

pub mod domain;
pub mod error;
pub mod keymap;
pub mod protocol;

pub use domain::config::MirrorConfig;
pub use domain::device::{Device, DeviceSet};
pub use domain::frame::{FrameError, RawFrame};
pub use domain::geometry::{DisplayGeometry, GeometryPipeline, Orientation};
pub use error::{ErrorKind, MirrorError};
pub use keymap::{AndroidKeyCode, KeyMapper, SymbolicKey};
pub use protocol::commands::ShellCommand;
