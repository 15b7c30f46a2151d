//! Device identity and device-list snapshots.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An attached device, identified only by its serial.
///
/// Two `Device` values are the same device exactly when their serials are
/// equal.  Devices are never mutated; a device that changes state simply
/// disappears from one snapshot and reappears in a later one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Device(String);

impl Device {
    /// Wraps a serial identifier.
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into())
    }

    /// Returns the serial passed to `adb -s`.
    pub fn serial(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered snapshot of the devices visible at one poll.
///
/// Order is whatever the channel reported.  Use [`DeviceSet::same_members`]
/// to compare snapshots; derived `PartialEq` is order-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    /// Creates an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a snapshot from serials, preserving their order.
    pub fn from_serials<I, S>(serials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        serials.into_iter().map(Device::new).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Returns the first reported device, if any.
    pub fn first(&self) -> Option<&Device> {
        self.devices.first()
    }

    pub fn contains(&self, device: &Device) -> bool {
        self.devices.contains(device)
    }

    /// Looks up a device by serial.
    pub fn find(&self, serial: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.serial() == serial)
    }

    /// Unordered set equality: `{A,B}` and `{B,A}` have the same members.
    pub fn same_members(&self, other: &DeviceSet) -> bool {
        let mine: HashSet<&Device> = self.devices.iter().collect();
        let theirs: HashSet<&Device> = other.devices.iter().collect();
        mine == theirs
    }
}

impl FromIterator<Device> for DeviceSet {
    fn from_iter<T: IntoIterator<Item = Device>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DeviceSet {
    type Item = Device;
    type IntoIter = std::vec::IntoIter<Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}
