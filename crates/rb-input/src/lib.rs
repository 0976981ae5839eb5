//! Input bridge for retrobridge
//!
//! Turns host key events into logical joypad button state for the
//! emulation backend, either by pushing a command per key transition or
//! by answering the backend's input-state requests.

pub mod bridge;
pub mod mapping;
pub mod pressed;
pub mod resolver;

pub use bridge::{attach_input_bridge, InputBridge, PollingInputBridge, PushInputBridge};
pub use mapping::KeyMapping;
pub use pressed::{KeyState, PressedKeySet};
pub use resolver::ButtonResolver;
