//! Scripted control channel backend for tests and offline demos.
//!
//! # Why a scripted backend?
//!
//! The real [`AdbBackend`](super::AdbBackend) needs the `adb` executable and
//! a phone plugged in.  `ScriptedBackend` instead answers every invocation
//! from a closure and records the argument vectors it was called with, so
//! tests can assert exactly which commands reached the channel.
//!
//! # Usage in tests
//!
//! ```ignore
//! let backend = Arc::new(ScriptedBackend::new());
//! let channel = ControlChannel::new(backend.clone());
//! channel.select_target(Some(Device::new("emulator-5554")));
//!
//! channel.run_shell_command("input keyevent 3").await.unwrap();
//!
//! assert_eq!(backend.shell_commands(), vec!["input keyevent 3"]);
//! ```
//!
//! # `should_fail` switch
//!
//! Call `set_failing(true)` to make every invocation return
//! [`MirrorError::Channel`], whatever the responder would have said.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use async_trait::async_trait;

use ars_core::MirrorError;

use crate::application::control_channel::ChannelBackend;

type Responder = Box<dyn Fn(&[String]) -> Result<Vec<u8>, MirrorError> + Send + Sync>;

/// A backend that answers from a closure and records every call.
pub struct ScriptedBackend {
    calls: Mutex<Vec<Vec<String>>>,
    responder: Responder,
    should_fail: AtomicBool,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBackend {
    /// Answers every call with empty output.
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(Vec::new()))
    }

    /// Answers every call with `responder(args)`.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&[String]) -> Result<Vec<u8>, MirrorError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Every argument vector received so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The command strings of all `shell` invocations, in order.
    pub fn shell_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|args| args.len() == 4 && args[2] == "shell")
            .map(|mut args| args.remove(3))
            .collect()
    }
}

#[async_trait]
impl ChannelBackend for ScriptedBackend {
    async fn execute(&self, args: Vec<String>) -> Result<Vec<u8>, MirrorError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.clone());
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(MirrorError::Channel("scripted failure".into()));
        }
        (self.responder)(&args)
    }
}
