//! Parser for the `adb devices` listing.
//!
//! ```text
//! * daemon not running; starting now at tcp:5037
//! * daemon started successfully
//! List of devices attached
//! emulator-5554\tdevice
//! R58M123ABC\tunauthorized
//! ```
//!
//! Everything up to and including the header line is skipped.  Each record
//! line carries tab-separated fields; the first one is the serial.

use crate::domain::device::{Device, DeviceSet};

const HEADER: &str = "List of devices attached";

/// Parses `adb devices` output into a snapshot, preserving report order.
///
/// Lines without a tab (daemon chatter, blank lines) are ignored.  If no
/// header is present the first line is treated as the header.
pub fn parse_device_list(output: &str) -> DeviceSet {
    let lines: Vec<&str> = output.lines().collect();
    let body_start = lines
        .iter()
        .position(|line| line.trim_end() == HEADER)
        .map_or(1, |i| i + 1);

    lines
        .iter()
        .skip(body_start)
        .filter_map(|line| {
            let (serial, _rest) = line.split_once('\t')?;
            let serial = serial.trim();
            (!serial.is_empty()).then(|| Device::new(serial))
        })
        .collect()
}
