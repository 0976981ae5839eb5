//! Frame bridge for retrobridge
//!
//! Receives RGBA frames rendered by the backend, copies them into a
//! persistent pixel buffer and presents that buffer on a display surface.

pub mod buffer;
pub mod presenter;
pub mod requester;
pub mod surface;

pub use buffer::{PixelBuffer, CHANNELS};
pub use presenter::{FramePresenter, PresenterStats, RenderEvent};
pub use requester::FrameRequester;
pub use surface::{DisplaySurface, MemorySurface, SurfaceFactory};
