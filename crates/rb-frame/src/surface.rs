//! Display surfaces
//!
//! A surface takes a whole [`PixelBuffer`] and puts it on screen. Smoothing
//! is switched off once when the surface is acquired so scaled pixel art
//! stays crisp.

use parking_lot::Mutex;
use rb_core::SurfaceError;
use std::sync::Arc;

use crate::buffer::PixelBuffer;

/// 2D raster target for presented frames
pub trait DisplaySurface: Send {
    /// Use nearest-neighbour sampling from now on
    fn disable_smoothing(&mut self);

    /// Blit `frame` to the display
    fn present(&mut self, frame: &PixelBuffer) -> Result<(), SurfaceError>;
}

/// Acquires a surface for the given frame size; may fail on hosts without one
pub type SurfaceFactory =
    Box<dyn FnOnce(u32, u32) -> Result<Box<dyn DisplaySurface>, SurfaceError> + Send>;

#[derive(Debug, Default)]
struct MemorySurfaceState {
    width: u32,
    height: u32,
    smoothing: bool,
    presented: u64,
    last: Option<Vec<u8>>,
}

/// Headless surface that keeps the last presented frame.
///
/// Clones share the same state, so a clone can be kept to inspect what the
/// presenter has shown.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    state: Arc<Mutex<MemorySurfaceState>>,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemorySurfaceState {
                width,
                height,
                smoothing: true,
                ..Default::default()
            })),
        }
    }

    /// Factory handing out a clone of `self`
    pub fn factory(&self) -> SurfaceFactory {
        let surface = self.clone();
        Box::new(move |_width, _height| Ok(Box::new(surface) as Box<dyn DisplaySurface>))
    }

    /// Factory that always fails, for hosts with no display
    pub fn unavailable(reason: &str) -> SurfaceFactory {
        let reason = reason.to_string();
        Box::new(move |_width, _height| Err(SurfaceError::Unsupported(reason)))
    }

    pub fn smoothing(&self) -> bool {
        self.state.lock().smoothing
    }

    /// Number of frames presented
    pub fn presented(&self) -> u64 {
        self.state.lock().presented
    }

    /// Bytes of the last presented frame
    pub fn last_frame(&self) -> Option<Vec<u8>> {
        self.state.lock().last.clone()
    }
}

impl DisplaySurface for MemorySurface {
    fn disable_smoothing(&mut self) {
        self.state.lock().smoothing = false;
    }

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), SurfaceError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if frame.width() != state.width || frame.height() != state.height {
            return Err(SurfaceError::SizeMismatch {
                width: frame.width(),
                height: frame.height(),
                surface_width: state.width,
                surface_height: state.height,
            });
        }

        match state.last.as_mut() {
            Some(last) => last.copy_from_slice(frame.as_bytes()),
            None => state.last = Some(frame.as_bytes().to_vec()),
        }
        state.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_surface_records_frames() {
        let probe = MemorySurface::new(2, 1);
        let mut surface = probe.clone();
        let mut frame = PixelBuffer::new(2, 1).unwrap();
        frame.copy_from(&[9, 8, 7, 6, 5, 4, 3, 2]).unwrap();

        surface.present(&frame).unwrap();
        assert_eq!(probe.presented(), 1);
        assert_eq!(probe.last_frame(), Some(vec![9, 8, 7, 6, 5, 4, 3, 2]));
    }

    #[test]
    fn test_size_mismatch() {
        let mut surface = MemorySurface::new(4, 4);
        let err = surface.present(&PixelBuffer::new(2, 2).unwrap()).unwrap_err();
        assert!(matches!(err, SurfaceError::SizeMismatch { .. }));
    }

    #[test]
    fn test_factories() {
        let probe = MemorySurface::new(1, 1);
        let mut surface = (probe.factory())(1, 1).unwrap();
        assert!(probe.smoothing());
        surface.disable_smoothing();
        assert!(!probe.smoothing());

        let err = (MemorySurface::unavailable("headless"))(1, 1).err();
        assert_eq!(err, Some(SurfaceError::Unsupported("headless".to_string())));
    }
}
