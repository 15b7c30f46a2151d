//! Application layer use cases for the viewer.
//!
//! # What use cases does the viewer have?
//!
//! - **`control_channel`** – The session-scoped handle every other use case
//!   talks to the device through.  It owns the selected target and delegates
//!   process execution to a `ChannelBackend` injected at construction time.
//!
//! - **`capture_transport`** – The single `capture()` contract behind which
//!   the two screenshot strategies live.
//!
//! - **`frame_loop`** – The paced, cancellable capture worker and the
//!   single-slot mailbox it publishes frames into.
//!
//! - **`surface`** – Messages the workers send to the thread that owns the
//!   display surface.
//!
//! - **`dispatch_input`** – Pointer and key events in display space turned
//!   into device shell commands.
//!
//! - **`watch_devices`** – Periodic device-list diffing.

pub mod capture_transport;
pub mod control_channel;
pub mod dispatch_input;
pub mod frame_loop;
pub mod surface;
pub mod watch_devices;
