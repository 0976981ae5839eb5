//! Button resolver
//!
//! Maps a key transition to a logical button and forwards it across the
//! boundary as a `SET_BUTTON` command.

use rb_core::{Boundary, BoundaryEvent, Joypad, LogicalButton};
use std::sync::Arc;

use crate::mapping::KeyMapping;

pub struct ButtonResolver {
    mapping: Arc<KeyMapping>,
    joypad: Joypad,
    boundary: Arc<dyn Boundary>,
}

impl ButtonResolver {
    pub fn new(mapping: Arc<KeyMapping>, joypad: Joypad, boundary: Arc<dyn Boundary>) -> Self {
        Self {
            mapping,
            joypad,
            boundary,
        }
    }

    /// Emit one command for `key` if it is bound.
    ///
    /// Unbound keys are ignored. Repeats are forwarded as-is.
    pub fn resolve(&self, key: &str, pressed: bool) -> Option<LogicalButton> {
        let Some(button) = self.mapping.button(key) else {
            tracing::trace!(key, "unmapped key ignored");
            return None;
        };

        tracing::trace!(key, %button, pressed, joypad = %self.joypad, "button command");
        self.boundary.emit(BoundaryEvent::SetButton {
            joypad: self.joypad,
            button,
            pressed,
        });
        Some(button)
    }

    pub fn joypad(&self) -> Joypad {
        self.joypad
    }

    pub fn mapping(&self) -> &KeyMapping {
        &self.mapping
    }
}
