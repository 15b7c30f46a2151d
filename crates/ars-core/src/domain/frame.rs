//! Captured screen frames.
//!
//! A [`RawFrame`] is an owned, immutable RGBA8 pixel buffer.  Every capture
//! cycle allocates a new one; nothing ever writes into a frame after it has
//! been built, so a frame can be handed to the render path behind an `Arc`
//! while the capture worker is already producing the next one.

use std::time::Instant;

use thiserror::Error;

/// Bytes per pixel of every [`RawFrame`] (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Error returned when a pixel buffer does not match its declared size.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has zero area ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("frame size {width}x{height} overflows the address space")]
    TooLarge { width: u32, height: u32 },

    #[error("pixel buffer is {actual} bytes, expected {expected} for {width}x{height}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// One captured screen image in device-native pixels.
#[derive(Debug, Clone)]
pub struct RawFrame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    captured_at: Instant,
}

impl RawFrame {
    /// Builds a frame stamped with the current instant.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] if either dimension is zero or `pixels` is not
    /// exactly `width * height * 4` bytes long.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, FrameError> {
        Self::with_timestamp(width, height, pixels, Instant::now())
    }

    /// Builds a frame with an explicit capture timestamp.
    pub fn with_timestamp(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        captured_at: Instant,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(FrameError::TooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            captured_at,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bytes_per_pixel(&self) -> usize {
        BYTES_PER_PIXEL
    }

    /// Row-major RGBA8 pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consumes the frame and returns its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Returns the RGBA value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let p = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Returns a new frame rotated 90° clockwise.
    ///
    /// The result is `height` wide and `width` tall.  Source pixel `(x, y)`
    /// lands at `(height - 1 - y, x)`.  The capture timestamp is preserved.
    pub fn rotated_clockwise(&self) -> RawFrame {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut out = vec![0u8; self.pixels.len()];
        // Output row `ny` is source column `ny`, read bottom to top.
        for ny in 0..w {
            for nx in 0..h {
                let src = ((h - 1 - nx) * w + ny) * BYTES_PER_PIXEL;
                let dst = (ny * h + nx) * BYTES_PER_PIXEL;
                out[dst..dst + BYTES_PER_PIXEL]
                    .copy_from_slice(&self.pixels[src..src + BYTES_PER_PIXEL]);
            }
        }
        RawFrame {
            width: self.height,
            height: self.width,
            pixels: out,
            captured_at: self.captured_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a frame whose red channel encodes the pixel index.
    fn indexed_frame(width: u32, height: u32) -> RawFrame {
        let mut pixels = Vec::new();
        for i in 0..(width * height) {
            pixels.extend_from_slice(&[i as u8, 0, 0, 255]);
        }
        RawFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_buffer_length() {
        let result = RawFrame::new(2, 2, vec![0; 15]);

        assert!(matches!(
            result,
            Err(FrameError::LengthMismatch { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn test_new_rejects_dimensions_whose_size_overflows() {
        let result = RawFrame::new(u32::MAX, u32::MAX, Vec::new());

        assert_eq!(
            result.unwrap_err(),
            FrameError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            }
        );
    }

    #[test]
    fn test_new_rejects_zero_area() {
        assert!(matches!(
            RawFrame::new(0, 10, Vec::new()),
            Err(FrameError::Empty { .. })
        ));
    }

    #[test]
    fn test_pixel_outside_bounds_is_none() {
        let frame = indexed_frame(3, 2);

        assert_eq!(frame.pixel(2, 1), Some([5, 0, 0, 255]));
        assert_eq!(frame.pixel(3, 0), None);
    }

    #[test]
    fn test_rotated_clockwise_swaps_dimensions() {
        let frame = indexed_frame(3, 2);

        let rotated = frame.rotated_clockwise();

        assert_eq!((rotated.width(), rotated.height()), (2, 3));
        assert_eq!(rotated.captured_at(), frame.captured_at());
    }

    #[test]
    fn test_rotated_clockwise_moves_pixels() {
        // 3x2 source:      rotated 2x3:
        //   0 1 2            3 0
        //   3 4 5            4 1
        //                    5 2
        let frame = indexed_frame(3, 2);

        let rotated = frame.rotated_clockwise();

        let reds: Vec<u8> = rotated.pixels().chunks(4).map(|p| p[0]).collect();
        assert_eq!(reds, vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_four_rotations_restore_original() {
        let frame = indexed_frame(4, 3);

        let back = frame
            .rotated_clockwise()
            .rotated_clockwise()
            .rotated_clockwise()
            .rotated_clockwise();

        assert_eq!(back.pixels(), frame.pixels());
    }
}
