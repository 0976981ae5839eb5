//! egui display surface
//!
//! The presenter hands frames to [`EguiSurface`] outside of egui's paint
//! pass, so the surface only stages a `ColorImage`. The app uploads the
//! staged image into its texture on the next UI frame.

use eframe::egui;
use parking_lot::Mutex;
use rb_core::SurfaceError;
use rb_frame::{DisplaySurface, PixelBuffer, SurfaceFactory};
use std::sync::Arc;

struct DisplayState {
    pending: Option<egui::ColorImage>,
    smoothing: bool,
    presented: u64,
}

/// State shared between the surface and the app
#[derive(Clone)]
pub struct SharedDisplay {
    inner: Arc<Mutex<DisplayState>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(DisplayState {
                pending: None,
                smoothing: true,
                presented: 0,
            })),
        }
    }

    /// Take the frame presented since the last call, if any
    pub fn take_pending(&self) -> Option<egui::ColorImage> {
        self.inner.lock().pending.take()
    }

    /// Sampling options for the frame texture
    pub fn texture_options(&self) -> egui::TextureOptions {
        if self.inner.lock().smoothing {
            egui::TextureOptions::LINEAR
        } else {
            egui::TextureOptions::NEAREST
        }
    }

    pub fn presented(&self) -> u64 {
        self.inner.lock().presented
    }

    /// Factory for an [`EguiSurface`] writing into this display.
    ///
    /// Fails when the frame does not fit in a single texture.
    pub fn factory(&self, max_texture_side: usize) -> SurfaceFactory {
        let display = self.clone();
        Box::new(move |width, height| {
            let side = width.max(height) as usize;
            if side > max_texture_side {
                return Err(SurfaceError::Unsupported(format!(
                    "{width}x{height} frame exceeds max texture side {max_texture_side}"
                )));
            }
            Ok(Box::new(EguiSurface { display }) as Box<dyn DisplaySurface>)
        })
    }
}

impl Default for SharedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface staging frames for an egui texture
pub struct EguiSurface {
    display: SharedDisplay,
}

impl DisplaySurface for EguiSurface {
    fn disable_smoothing(&mut self) {
        self.display.inner.lock().smoothing = false;
    }

    fn present(&mut self, frame: &PixelBuffer) -> Result<(), SurfaceError> {
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width() as usize, frame.height() as usize],
            frame.as_bytes(),
        );
        let mut state = self.display.inner.lock();
        // Unconsumed frames are replaced
        state.pending = Some(image);
        state.presented += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_stages_latest_frame() {
        let display = SharedDisplay::new();
        let mut surface = (display.factory(2048))(2, 1).unwrap();
        surface.disable_smoothing();
        assert_eq!(display.texture_options(), egui::TextureOptions::NEAREST);

        let mut frame = PixelBuffer::new(2, 1).unwrap();
        frame.copy_from(&[255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
        surface.present(&frame).unwrap();
        frame.copy_from(&[0, 0, 255, 255, 0, 0, 255, 255]).unwrap();
        surface.present(&frame).unwrap();

        let image = display.take_pending().unwrap();
        assert_eq!(image.size, [2, 1]);
        assert_eq!(image.pixels[0], egui::Color32::from_rgb(0, 0, 255));
        assert!(display.take_pending().is_none());
        assert_eq!(display.presented(), 2);
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let display = SharedDisplay::new();
        let result = (display.factory(128))(256, 240);
        assert!(matches!(result, Err(SurfaceError::Unsupported(_))));
    }
}
