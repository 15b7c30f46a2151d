//! The text and byte formats exchanged with the control channel.
//!
//! # Layout
//!
//! - [`commands`] – Shell command templates sent to the device.
//! - [`devices`] – Parser for the `adb devices` listing.
//! - [`sanitize`] – Undoes the line-ending corruption a text-mode transport
//!   applies to binary output.
//! - [`framebuffer`] – Decoder for the binary `screencap` record.

pub mod commands;
pub mod devices;
pub mod framebuffer;
pub mod sanitize;
