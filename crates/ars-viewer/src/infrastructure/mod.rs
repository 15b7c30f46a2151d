//! Infrastructure layer for the viewer.
//!
//! Contains everything that touches the outside world:
//!
//! - [`adb`] – Spawns the `adb` executable; plus a scripted stand-in for
//!   tests and demos.
//! - [`capture`] – The two screenshot strategies and PNG file output.
//! - [`storage`] – The TOML configuration file.

pub mod adb;
pub mod capture;
pub mod storage;
