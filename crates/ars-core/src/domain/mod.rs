//! Domain entities: devices, captured frames, display geometry, and the
//! immutable mirroring configuration.

pub mod config;
pub mod device;
pub mod frame;
pub mod geometry;
