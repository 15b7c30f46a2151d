//! Persistent storage for the viewer.

pub mod config;
