//! Desktop front end for retrobridge

pub mod app;
pub mod keys;
pub mod surface;

pub use app::RetroBridgeApp;
pub use surface::{EguiSurface, SharedDisplay};
