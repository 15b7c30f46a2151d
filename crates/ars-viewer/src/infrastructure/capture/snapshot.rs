//! PNG encoding of captured frames.

use std::path::Path;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, ImageFormat, ImageResult, RgbaImage};
use tracing::{error, info};

use ars_core::RawFrame;

/// Writes `frame` to `path` as a PNG file.
///
/// Returns `true` on success.  Failures are logged, not returned.
pub fn save_frame_png(frame: &RawFrame, path: &Path) -> bool {
    let Some(image) = RgbaImage::from_raw(frame.width(), frame.height(), frame.pixels().to_vec())
    else {
        error!("frame buffer does not match its dimensions; nothing written");
        return false;
    };
    match image.save_with_format(path, ImageFormat::Png) {
        Ok(()) => {
            info!(path = %path.display(), "screenshot saved");
            true
        }
        Err(e) => {
            error!(path = %path.display(), "failed to save screenshot: {e}");
            false
        }
    }
}

/// Encodes `frame` as PNG bytes in memory.
///
/// Encoder failures are reported as the `image` crate's own error; they are
/// not capture failures.
pub fn encode_png(frame: &RawFrame) -> ImageResult<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out).write_image(
        frame.pixels(),
        frame.width(),
        frame.height(),
        ColorType::Rgba8,
    )?;
    Ok(out)
}
