//! ars-viewer library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the viewer do? (for beginners)
//!
//! The viewer mirrors the screen of an Android device attached over USB or
//! TCP and lets you drive it from the host:
//!
//! 1. A **device watcher** polls `adb devices` every few seconds and reports
//!    when phones appear or disappear.
//! 2. A **frame loop** repeatedly asks the device for a screenshot, decodes
//!    it, rotates it if you are viewing in landscape, and hands the newest
//!    frame to whoever is drawing the window.
//! 3. An **input dispatcher** turns clicks, drags and key presses on the
//!    mirrored image back into `input tap`, `input swipe` and
//!    `input keyevent` commands in device coordinates.
//!
//! All three talk to the phone through one shared `ControlChannel`, which
//! owns the currently selected target device.

/// Application layer: use cases and the seams they depend on.
pub mod application;

/// Infrastructure layer: the adb process backend, capture strategies, and
/// configuration storage.
pub mod infrastructure;
