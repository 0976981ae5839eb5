//! Controller model shared with the emulation backend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical controller button, independent of any physical key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalButton {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

impl LogicalButton {
    /// Number of logical buttons
    pub const COUNT: usize = 8;

    /// Every button, in index order
    pub const ALL: [LogicalButton; Self::COUNT] = [
        LogicalButton::Up,
        LogicalButton::Down,
        LogicalButton::Left,
        LogicalButton::Right,
        LogicalButton::A,
        LogicalButton::B,
        LogicalButton::Start,
        LogicalButton::Select,
    ];

    /// Dense index usable for fixed-size tables
    pub const fn index(self) -> usize {
        match self {
            LogicalButton::Up => 0,
            LogicalButton::Down => 1,
            LogicalButton::Left => 2,
            LogicalButton::Right => 3,
            LogicalButton::A => 4,
            LogicalButton::B => 5,
            LogicalButton::Start => 6,
            LogicalButton::Select => 7,
        }
    }

    /// Name of the button on the wire (`REQUEST_INPUT_<name>` etc.)
    pub const fn wire_name(self) -> &'static str {
        match self {
            LogicalButton::Up => "UP",
            LogicalButton::Down => "DOWN",
            LogicalButton::Left => "LEFT",
            LogicalButton::Right => "RIGHT",
            LogicalButton::A => "A",
            LogicalButton::B => "B",
            LogicalButton::Start => "START",
            LogicalButton::Select => "SELECT",
        }
    }

    /// Parse a wire name back into a button
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.wire_name() == name)
    }
}

impl fmt::Display for LogicalButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Addressable logical controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Joypad {
    #[default]
    Primary,
    Secondary,
}

impl Joypad {
    pub const ALL: [Joypad; 2] = [Joypad::Primary, Joypad::Secondary];

    pub const fn index(self) -> usize {
        match self {
            Joypad::Primary => 0,
            Joypad::Secondary => 1,
        }
    }

    pub const fn wire_name(self) -> &'static str {
        match self {
            Joypad::Primary => "PRIMARY",
            Joypad::Secondary => "SECONDARY",
        }
    }
}

impl fmt::Display for Joypad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
