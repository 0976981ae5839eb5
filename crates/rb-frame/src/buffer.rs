//! Pixel buffer
//!
//! Fixed-size RGBA frame in row-major order. Its dimensions never change;
//! incoming frames must match exactly.

use rb_core::config::MAX_DISPLAY_SIDE;
use rb_core::{FrameFormatError, FrameSizeError};

/// Bytes per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Box<[u8]>,
}

impl PixelBuffer {
    /// Create a zeroed buffer.
    ///
    /// Fails without allocating when either side exceeds `MAX_DISPLAY_SIDE`.
    pub fn new(width: u32, height: u32) -> Result<Self, FrameSizeError> {
        let len = Self::frame_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len].into_boxed_slice(),
        })
    }

    /// Payload length a `width` x `height` frame must have
    pub fn frame_len(width: u32, height: u32) -> Result<usize, FrameSizeError> {
        let err = FrameSizeError {
            width,
            height,
            max: MAX_DISPLAY_SIDE,
        };
        if width > MAX_DISPLAY_SIDE || height > MAX_DISPLAY_SIDE {
            return Err(err);
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(CHANNELS))
            .ok_or(err)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Replace the whole frame with `payload`.
    ///
    /// Channel order and offsets are preserved byte for byte. A payload of
    /// any other length is rejected and the buffer is left untouched.
    pub fn copy_from(&mut self, payload: &[u8]) -> Result<(), FrameFormatError> {
        if payload.len() != self.data.len() {
            return Err(FrameFormatError {
                width: self.width,
                height: self.height,
                expected: self.data.len(),
                actual: payload.len(),
            });
        }
        self.data.copy_from_slice(payload);
        Ok(())
    }

    /// RGBA value at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; CHANNELS]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let mut rgba = [0; CHANNELS];
        rgba.copy_from_slice(&self.data[offset..offset + CHANNELS]);
        Some(rgba)
    }
}
