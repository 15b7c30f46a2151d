//! Shell command templates understood by the device.
//!
//! Commands are composed here and handed to the control channel as opaque
//! strings; the channel never interprets them.  Coordinates are always in
//! device pixels and always formatted with a `.` decimal separator.

use std::fmt;

use crate::keymap::AndroidKeyCode;

/// A command run on the device through `adb shell` or `adb exec-out`.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    /// `input keyevent <code>`
    KeyEvent(AndroidKeyCode),
    /// `input tap <x> <y>`
    Tap { x: f64, y: f64 },
    /// `input swipe <x1> <y1> <x2> <y2> <duration_ms>`
    Swipe {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        duration_ms: u64,
    },
    /// `screencap -p`: PNG to stdout.
    ScreencapPng,
    /// `screencap`: raw framebuffer record to stdout.
    ScreencapRaw,
    /// `screencap -p <path>`: PNG written to a file on the device.
    ScreencapToFile(String),
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellCommand::KeyEvent(code) => write!(f, "input keyevent {}", code.0),
            ShellCommand::Tap { x, y } => write!(f, "input tap {x:.1} {y:.1}"),
            ShellCommand::Swipe {
                x1,
                y1,
                x2,
                y2,
                duration_ms,
            } => write!(f, "input swipe {x1:.0} {y1:.0} {x2:.0} {y2:.0} {duration_ms}"),
            ShellCommand::ScreencapPng => f.write_str("screencap -p"),
            ShellCommand::ScreencapRaw => f.write_str("screencap"),
            ShellCommand::ScreencapToFile(path) => write!(f, "screencap -p {path}"),
        }
    }
}
