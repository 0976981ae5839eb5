//! Loopback backend
//!
//! In-process stand-in for the emulation core. It latches joypad state from
//! `SET_BUTTON` commands (or from `RECEIVE_INPUT_*` answers when polling),
//! renders a test pattern that reacts to the latches, pushes it as
//! `RENDER` on every tick, and answers `REQUEST_FRAME`.

use parking_lot::Mutex;
use rb_core::config::InputStrategy;
use rb_core::{
    Boundary, BoundaryEvent, BridgeError, EventBus, Joypad, LogicalButton, Request, Response,
    Topic,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Side length of the movable square, in pixels
const CURSOR_SIZE: u32 = 16;

/// Loopback backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendState {
    Running,
    Paused,
}

#[derive(Debug, Default)]
struct Latches {
    /// Held state per joypad, indexed by `LogicalButton::index`
    pads: [[bool; LogicalButton::COUNT]; 2],
    cursor: (u32, u32),
}

pub struct LoopbackBackend {
    bus: EventBus,
    width: u32,
    height: u32,
    strategy: InputStrategy,
    state: Mutex<BackendState>,
    latches: Mutex<Latches>,
    frames: AtomicU64,
}

impl LoopbackBackend {
    /// Create the backend and register its handlers on `bus`
    pub fn attach(
        bus: EventBus,
        width: u32,
        height: u32,
        strategy: InputStrategy,
        start_paused: bool,
    ) -> Arc<Self> {
        let backend = Arc::new(Self {
            bus: bus.clone(),
            width,
            height,
            strategy,
            state: Mutex::new(if start_paused {
                BackendState::Paused
            } else {
                BackendState::Running
            }),
            latches: Mutex::new(Latches {
                cursor: (
                    width.saturating_sub(CURSOR_SIZE) / 2,
                    height.saturating_sub(CURSOR_SIZE) / 2,
                ),
                ..Default::default()
            }),
            frames: AtomicU64::new(0),
        });

        let weak: Weak<Self> = Arc::downgrade(&backend);
        bus.subscribe(
            Topic::SetButton,
            Arc::new(move |event| {
                if let (Some(backend), BoundaryEvent::SetButton { joypad, button, pressed }) =
                    (weak.upgrade(), event)
                {
                    backend.latch(*joypad, *button, *pressed);
                }
            }),
        );

        // Polled answers only ever describe the keyboard-driven pad
        for button in LogicalButton::ALL {
            let weak: Weak<Self> = Arc::downgrade(&backend);
            bus.subscribe(
                Topic::ReceiveInput(button),
                Arc::new(move |event| {
                    if let (Some(backend), BoundaryEvent::ReceiveInput { button, pressed }) =
                        (weak.upgrade(), event)
                    {
                        backend.latch(Joypad::Primary, *button, *pressed);
                    }
                }),
            );
        }

        let weak: Weak<Self> = Arc::downgrade(&backend);
        bus.serve(Arc::new(move |request| {
            let backend = weak
                .upgrade()
                .ok_or_else(|| BridgeError::Backend("loopback backend dropped".to_string()))?;
            match request {
                Request::CurrentFrame => Ok(Response::Frame(backend.render())),
            }
        }));

        tracing::info!(width, height, ?strategy, "loopback backend attached");
        backend
    }

    fn latch(&self, joypad: Joypad, button: LogicalButton, pressed: bool) {
        self.latches.lock().pads[joypad.index()][button.index()] = pressed;
    }

    /// Whether `button` is latched as held on `joypad`
    pub fn is_held(&self, joypad: Joypad, button: LogicalButton) -> bool {
        self.latches.lock().pads[joypad.index()][button.index()]
    }

    pub fn state(&self) -> BackendState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: BackendState) {
        *self.state.lock() = state;
        tracing::info!(?state, "loopback backend state changed");
    }

    /// Frames pushed so far
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Advance one frame: poll input if configured, move the cursor, push a frame
    pub fn tick(&self) {
        if self.state() == BackendState::Paused {
            return;
        }

        if self.strategy == InputStrategy::Poll {
            for button in LogicalButton::ALL {
                self.bus.emit(BoundaryEvent::RequestInput(button));
            }
        }

        self.step_cursor();
        self.frames.fetch_add(1, Ordering::AcqRel);
        self.bus.emit(BoundaryEvent::Render(self.render()));
    }

    fn step_cursor(&self) {
        let mut latches = self.latches.lock();
        let pad = latches.pads[Joypad::Primary.index()];
        let max_x = self.width.saturating_sub(CURSOR_SIZE);
        let max_y = self.height.saturating_sub(CURSOR_SIZE);
        let (mut x, mut y) = latches.cursor;

        if pad[LogicalButton::Left.index()] {
            x = x.saturating_sub(1);
        }
        if pad[LogicalButton::Right.index()] {
            x = (x + 1).min(max_x);
        }
        if pad[LogicalButton::Up.index()] {
            y = y.saturating_sub(1);
        }
        if pad[LogicalButton::Down.index()] {
            y = (y + 1).min(max_y);
        }
        latches.cursor = (x, y);
    }

    /// Render the current test pattern as flat RGBA
    pub fn render(&self) -> Arc<[u8]> {
        let latches = self.latches.lock();
        let pad = latches.pads[Joypad::Primary.index()];
        let (cx, cy) = latches.cursor;
        let phase = self.frames() as u32;

        let a = pad[LogicalButton::A.index()];
        let b = pad[LogicalButton::B.index()];
        let cursor_color: [u8; 3] = match (a, b) {
            (true, _) => [0xE0, 0x40, 0x40],
            (false, true) => [0x40, 0x60, 0xE0],
            (false, false) => [0xF0, 0xF0, 0xF0],
        };
        let invert = pad[LogicalButton::Start.index()] || pad[LogicalButton::Select.index()];

        let mut pixels: Vec<u8> =
            Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let in_cursor =
                    x >= cx && x < cx + CURSOR_SIZE && y >= cy && y < cy + CURSOR_SIZE;
                let mut rgb = if in_cursor {
                    cursor_color
                } else {
                    let checker = ((x / 8) + (y / 8) + phase / 8) % 2 == 0;
                    if checker {
                        [0x20, 0x20, 0x28]
                    } else {
                        [0x30, 0x30, 0x3C]
                    }
                };
                if invert {
                    rgb = rgb.map(|c| 0xFF - c);
                }
                pixels.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 0xFF]);
            }
        }
        pixels.into()
    }
}
