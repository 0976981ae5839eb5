//! Integration layer for retrobridge
//!
//! This crate wires the input and frame bridges to a boundary according
//! to the configuration, and provides a loopback backend that stands in
//! for the emulation core.

pub mod frontend;
pub mod loopback;

pub use frontend::{BridgeStats, FrontendBridge};
pub use loopback::{BackendState, LoopbackBackend};
