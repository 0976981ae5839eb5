//! Frame presenter
//!
//! Owns the pixel buffer and the display surface. Every accepted frame is
//! copied whole into the buffer and then presented; the last frame
//! processed wins. Without a surface, frames are still accepted and copied
//! but nothing is shown.

use parking_lot::Mutex;
use rb_core::{Boundary, BoundaryEvent, FrameFormatError, FrameSizeError, Topic};
use std::sync::{Arc, Weak};

use crate::buffer::PixelBuffer;
use crate::surface::{DisplaySurface, SurfaceFactory};

/// Why a frame was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    /// Backend pushed it after rendering
    Push,
    /// Answer to an explicit diagnostic request
    Pull,
}

/// Presenter counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenterStats {
    /// Frames accepted from `RENDER` notifications
    pub pushed: u64,
    /// Frames accepted from pull requests
    pub pulled: u64,
    /// Frames shown on the surface
    pub presented: u64,
    /// Frames rejected for their length
    pub rejected: u64,
    /// Surface failures while presenting
    pub surface_errors: u64,
}

pub struct FramePresenter {
    buffer: Mutex<PixelBuffer>,
    surface: Mutex<Option<Box<dyn DisplaySurface>>>,
    stats: Mutex<PresenterStats>,
}

impl FramePresenter {
    /// Create a presenter for `width` x `height` frames.
    ///
    /// Fails before acquiring a surface if the frame is too large to
    /// buffer. If the surface cannot be acquired, presentation is disabled
    /// and a single warning is logged.
    pub fn new(
        width: u32,
        height: u32,
        factory: SurfaceFactory,
    ) -> Result<Arc<Self>, FrameSizeError> {
        let buffer = PixelBuffer::new(width, height)?;
        let surface = match factory(width, height) {
            Ok(mut surface) => {
                surface.disable_smoothing();
                tracing::info!(width, height, "display surface acquired");
                Some(surface)
            }
            Err(err) => {
                tracing::warn!(%err, "display surface unavailable, presentation disabled");
                None
            }
        };

        Ok(Arc::new(Self {
            buffer: Mutex::new(buffer),
            surface: Mutex::new(surface),
            stats: Mutex::new(PresenterStats::default()),
        }))
    }

    /// Subscribe to `RENDER` notifications
    pub fn attach(self: &Arc<Self>, boundary: &dyn Boundary) {
        let weak: Weak<Self> = Arc::downgrade(self);
        boundary.subscribe(
            Topic::Render,
            Arc::new(move |event| {
                let (Some(presenter), BoundaryEvent::Render(payload)) = (weak.upgrade(), event)
                else {
                    return;
                };
                // Rejections are logged and counted inside `receive`
                let _ = presenter.receive(payload, RenderEvent::Push);
            }),
        );
    }

    /// Copy `payload` into the buffer and present it.
    ///
    /// A payload of the wrong length is rejected whole; the buffer keeps the
    /// previous frame.
    pub fn receive(&self, payload: &[u8], event: RenderEvent) -> Result<(), FrameFormatError> {
        let mut buffer = self.buffer.lock();

        if let Err(err) = buffer.copy_from(payload) {
            self.stats.lock().rejected += 1;
            tracing::warn!(%err, ?event, "rejecting malformed frame");
            return Err(err);
        }

        let mut stats = self.stats.lock();
        match event {
            RenderEvent::Push => stats.pushed += 1,
            RenderEvent::Pull => stats.pulled += 1,
        }

        if let Some(surface) = self.surface.lock().as_mut() {
            match surface.present(&buffer) {
                Ok(()) => stats.presented += 1,
                Err(err) => {
                    stats.surface_errors += 1;
                    tracing::warn!(%err, "failed to present frame");
                }
            }
        }
        Ok(())
    }

    /// Whether a surface was acquired
    pub fn presentation_enabled(&self) -> bool {
        self.surface.lock().is_some()
    }

    /// Copy of the current buffer
    pub fn snapshot(&self) -> PixelBuffer {
        self.buffer.lock().clone()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let buffer = self.buffer.lock();
        (buffer.width(), buffer.height())
    }

    pub fn stats(&self) -> PresenterStats {
        *self.stats.lock()
    }
}
