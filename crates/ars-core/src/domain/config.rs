//! The immutable configuration a mirroring session is built from.
//!
//! How these values are persisted is the viewer's business; the core only
//! sees the resolved struct.

use std::path::PathBuf;

/// Startup settings for one mirroring session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Path or name of the control channel executable (`adb`).
    pub channel_path: PathBuf,
    /// Pause between two capture cycles.
    pub frame_delay_ms: u64,
    /// Expected native device width before the first frame arrives.
    pub width: u32,
    /// Expected native device height before the first frame arrives.
    pub height: u32,
    /// Initial scale in percent of the native size.
    pub scale_percent: u32,
}

impl MirrorConfig {
    /// The scale as a factor (`50` → `0.5`).
    pub fn scale_factor(&self) -> f64 {
        self.scale_percent as f64 / 100.0
    }

    /// Size of the viewer surface at the initial scale.
    pub fn surface_size(&self) -> (u32, u32) {
        let f = self.scale_factor();
        (
            ((self.width as f64 * f).round() as u32).max(1),
            ((self.height as f64 * f).round() as u32).max(1),
        )
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            channel_path: PathBuf::from("adb"),
            frame_delay_ms: 500,
            width: 480,
            height: 800,
            scale_percent: 50,
        }
    }
}
