//! Decoder for the binary record written by `screencap` without `-p`.
//!
//! # Record layout
//!
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────────┬──────────────────────┐
//! │ width    │ height   │ format   │ colorspace   │ pixels               │
//! │ u32 LE   │ u32 LE   │ u32 LE   │ u32 LE (opt) │ height × stride      │
//! └──────────┴──────────┴──────────┴──────────────┴──────────────────────┘
//! ```
//!
//! Devices before Android 9 omit the colorspace word, so the header is 12 or
//! 16 bytes.  The decoder picks whichever header length leaves enough bytes
//! for the pixel data, preferring an exact fit.
//!
//! The record travels over `exec-out`, which is binary clean: no line-ending
//! repair is applied.

use thiserror::Error;

use crate::domain::frame::{RawFrame, BYTES_PER_PIXEL};

const SHORT_HEADER_LEN: usize = 12;
const LONG_HEADER_LEN: usize = 16;

/// Errors raised while decoding a framebuffer record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramebufferError {
    #[error("framebuffer header truncated: {len} bytes")]
    TruncatedHeader { len: usize },

    #[error("unsupported framebuffer pixel format {0}")]
    UnsupportedFormat(u32),

    #[error("framebuffer has zero area ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("framebuffer pixel data truncated: need {expected} bytes, got {actual}")]
    ShortPixelData { expected: usize, actual: usize },

    #[error("framebuffer size {width}x{height} overflows the address space")]
    TooLarge { width: u32, height: u32 },
}

/// Pixel layouts reported in the `format` word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgba8888,
    Rgbx8888,
    Rgb888,
    Rgb565,
    Bgra8888,
}

impl PixelLayout {
    /// Maps the Android `PixelFormat` constant to a layout.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(PixelLayout::Rgba8888),
            2 => Some(PixelLayout::Rgbx8888),
            3 => Some(PixelLayout::Rgb888),
            4 => Some(PixelLayout::Rgb565),
            5 => Some(PixelLayout::Bgra8888),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            PixelLayout::Rgba8888 => 1,
            PixelLayout::Rgbx8888 => 2,
            PixelLayout::Rgb888 => 3,
            PixelLayout::Rgb565 => 4,
            PixelLayout::Bgra8888 => 5,
        }
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelLayout::Rgb565 => 16,
            PixelLayout::Rgb888 => 24,
            _ => 32,
        }
    }

    fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() / 8) as usize
    }

    fn to_rgba(self, px: &[u8]) -> [u8; 4] {
        match self {
            PixelLayout::Rgba8888 => [px[0], px[1], px[2], px[3]],
            PixelLayout::Rgbx8888 => [px[0], px[1], px[2], 0xFF],
            PixelLayout::Rgb888 => [px[0], px[1], px[2], 0xFF],
            PixelLayout::Bgra8888 => [px[2], px[1], px[0], px[3]],
            PixelLayout::Rgb565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let r = ((v >> 11) & 0x1F) as u8;
                let g = ((v >> 5) & 0x3F) as u8;
                let b = (v & 0x1F) as u8;
                [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 0xFF]
            }
        }
    }
}

/// A decoded record header plus a borrowed view of its pixel rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferRecord<'a> {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    /// Bytes per row.
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> FramebufferRecord<'a> {
    /// Parses a record without copying the pixel data.
    ///
    /// # Errors
    ///
    /// Returns [`FramebufferError`] if the header is truncated, the format is
    /// unknown, the frame is empty, or the pixel data is shorter than
    /// `height × stride`.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FramebufferError> {
        if bytes.len() < SHORT_HEADER_LEN {
            return Err(FramebufferError::TruncatedHeader { len: bytes.len() });
        }
        let width = read_u32(bytes, 0);
        let height = read_u32(bytes, 4);
        let code = read_u32(bytes, 8);
        let layout = PixelLayout::from_code(code).ok_or(FramebufferError::UnsupportedFormat(code))?;
        if width == 0 || height == 0 {
            return Err(FramebufferError::EmptyFrame { width, height });
        }

        // Header values come from the device; size arithmetic must not wrap.
        let too_large = || FramebufferError::TooLarge { width, height };
        let stride = (width as usize)
            .checked_mul(layout.bytes_per_pixel())
            .ok_or_else(too_large)?;
        let expected = stride.checked_mul(height as usize).ok_or_else(too_large)?;
        let short_total = SHORT_HEADER_LEN.checked_add(expected).ok_or_else(too_large)?;
        let long_total = LONG_HEADER_LEN.checked_add(expected).ok_or_else(too_large)?;

        let header_len = if bytes.len() == short_total {
            SHORT_HEADER_LEN
        } else if bytes.len() >= long_total {
            LONG_HEADER_LEN
        } else if bytes.len() >= short_total {
            SHORT_HEADER_LEN
        } else {
            return Err(FramebufferError::ShortPixelData {
                expected,
                actual: bytes.len().saturating_sub(SHORT_HEADER_LEN),
            });
        };

        Ok(Self {
            width,
            height,
            layout,
            stride,
            data: &bytes[header_len..header_len + expected],
        })
    }

    /// Converts the record into a freshly allocated RGBA8 frame.
    pub fn to_raw_frame(&self) -> Result<RawFrame, FramebufferError> {
        let bpp = self.layout.bytes_per_pixel();
        let capacity = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(FramebufferError::TooLarge {
                width: self.width,
                height: self.height,
            })?;
        let mut rgba = Vec::with_capacity(capacity);
        for row in self.data.chunks_exact(self.stride) {
            for px in row.chunks_exact(bpp) {
                rgba.extend_from_slice(&self.layout.to_rgba(px));
            }
        }
        RawFrame::new(self.width, self.height, rgba).map_err(|_| FramebufferError::ShortPixelData {
            expected: self.stride * self.height as usize,
            actual: self.data.len(),
        })
    }
}

/// Decodes a raw `screencap` record straight into a [`RawFrame`].
pub fn decode_framebuffer(bytes: &[u8]) -> Result<RawFrame, FramebufferError> {
    FramebufferRecord::parse(bytes)?.to_raw_frame()
}

/// Builds a record with the 16-byte header, as a current device would send.
///
/// `pixels` must already be in `layout`.
pub fn encode_framebuffer(width: u32, height: u32, layout: PixelLayout, pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(LONG_HEADER_LEN + pixels.len());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&layout.code().to_le_bytes());
    // sRGB
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(pixels);
    out
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short_header(width: u32, height: u32, code: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&code.to_le_bytes());
        out
    }

    #[test]
    fn test_decode_rgba_with_long_header() {
        let pixels = [10, 20, 30, 40, 50, 60, 70, 80];
        let bytes = encode_framebuffer(2, 1, PixelLayout::Rgba8888, &pixels);

        let frame = decode_framebuffer(&bytes).unwrap();

        assert_eq!((frame.width(), frame.height()), (2, 1));
        assert_eq!(frame.pixels(), &pixels);
    }

    #[test]
    fn test_decode_rejects_header_whose_size_overflows() {
        // Arrange: 2^31 x 2^31 RGBA would need 2^64 bytes.
        let bytes = short_header(0x8000_0000, 0x8000_0000, 1);

        // Act
        let result = decode_framebuffer(&bytes);

        // Assert
        assert_eq!(
            result.unwrap_err(),
            FramebufferError::TooLarge {
                width: 0x8000_0000,
                height: 0x8000_0000
            }
        );
    }

    #[test]
    fn test_decode_with_short_header() {
        let mut bytes = short_header(1, 1, 1);
        bytes.extend_from_slice(&[1, 2, 3, 4]);

        let record = FramebufferRecord::parse(&bytes).unwrap();

        assert_eq!(record.data, &[1, 2, 3, 4]);
        assert_eq!(record.stride, 4);
    }

    #[test]
    fn test_decode_bgra_swaps_channels() {
        let bytes = encode_framebuffer(1, 1, PixelLayout::Bgra8888, &[0x10, 0x20, 0x30, 0xFF]);

        let frame = decode_framebuffer(&bytes).unwrap();

        assert_eq!(frame.pixel(0, 0), Some([0x30, 0x20, 0x10, 0xFF]));
    }

    #[test]
    fn test_decode_rgbx_forces_opaque_alpha() {
        let bytes = encode_framebuffer(1, 1, PixelLayout::Rgbx8888, &[1, 2, 3, 0]);

        let frame = decode_framebuffer(&bytes).unwrap();

        assert_eq!(frame.pixel(0, 0), Some([1, 2, 3, 0xFF]));
    }

    #[test]
    fn test_decode_rgb565_expands_to_full_range() {
        // Pure red, pure green, pure blue.
        let pixels = [0x00, 0xF8, 0xE0, 0x07, 0x1F, 0x00];
        let bytes = encode_framebuffer(3, 1, PixelLayout::Rgb565, &pixels);

        let frame = decode_framebuffer(&bytes).unwrap();

        assert_eq!(frame.pixel(0, 0), Some([0xFF, 0, 0, 0xFF]));
        assert_eq!(frame.pixel(1, 0), Some([0, 0xFF, 0, 0xFF]));
        assert_eq!(frame.pixel(2, 0), Some([0, 0, 0xFF, 0xFF]));
    }

    #[test]
    fn test_record_reports_bits_per_pixel() {
        let bytes = encode_framebuffer(2, 2, PixelLayout::Rgb888, &[0; 12]);

        let record = FramebufferRecord::parse(&bytes).unwrap();

        assert_eq!(record.layout.bits_per_pixel(), 24);
        assert_eq!(record.stride, 6);
    }

    #[test]
    fn test_truncated_header_is_rejected() {
        assert_eq!(
            FramebufferRecord::parse(&[0; 7]),
            Err(FramebufferError::TruncatedHeader { len: 7 })
        );
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let bytes = short_header(1, 1, 42);

        assert_eq!(
            FramebufferRecord::parse(&bytes),
            Err(FramebufferError::UnsupportedFormat(42))
        );
    }

    #[test]
    fn test_short_pixel_data_is_rejected() {
        let mut bytes = short_header(2, 2, 1);
        bytes.extend_from_slice(&[0; 10]);

        assert_eq!(
            FramebufferRecord::parse(&bytes),
            Err(FramebufferError::ShortPixelData {
                expected: 16,
                actual: 10
            })
        );
    }

    #[test]
    fn test_zero_area_is_rejected() {
        let bytes = short_header(0, 5, 1);

        assert!(matches!(
            FramebufferRecord::parse(&bytes),
            Err(FramebufferError::EmptyFrame { .. })
        ));
    }
}
