//! Core types for the retrobridge front-end boundary layer
//!
//! This crate provides the controller model shared with the emulation
//! backend, the typed boundary primitives (emit / subscribe / invoke) with
//! an in-process event bus, error handling, configuration, logging and
//! timing instrumentation.

pub mod boundary;
pub mod config;
pub mod error;
pub mod joypad;
pub mod logging;
pub mod timing;

pub use boundary::{
    Boundary, BoundaryEvent, EventBus, EventHandler, ReplyHandler, Request, RequestId,
    RequestService, Response, Topic,
};
pub use config::Config;
pub use error::{
    BridgeError, ConfigError, FrameFormatError, FrameSizeError, KeyMappingError,
    RequestInFlightError, Result, SurfaceError,
};
pub use joypad::{Joypad, LogicalButton};
pub use timing::{time, time_with, ScopedTimer, TimingReport, TimingSink};
