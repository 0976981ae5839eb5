//! Input bridge strategies
//!
//! Both strategies observe every key event into a [`PressedKeySet`]. They
//! differ in who drives the exchange:
//!
//! - [`PushInputBridge`] sends a `SET_BUTTON` command on every bound key
//!   transition.
//! - [`PollingInputBridge`] stays quiet until the backend emits
//!   `REQUEST_INPUT_<B>`, then answers with `RECEIVE_INPUT_<B>`.

use rb_core::config::InputStrategy;
use rb_core::{Boundary, BoundaryEvent, Joypad, LogicalButton, Topic};
use std::sync::{Arc, Weak};

use crate::mapping::KeyMapping;
use crate::pressed::PressedKeySet;
use crate::resolver::ButtonResolver;

/// Key events in, button state out
pub trait InputBridge: Send + Sync {
    /// Feed a key-down (`pressed = true`) or key-up event
    fn observe_key(&self, key: &str, pressed: bool);

    /// Current state of `button`; false until its key is observed held
    fn answer_query(&self, button: LogicalButton) -> bool;

    /// Which strategy this is
    fn strategy(&self) -> InputStrategy;

    /// Keys observed so far
    fn pressed_keys(&self) -> &PressedKeySet;
}

/// Pushes one command per key transition
pub struct PushInputBridge {
    resolver: ButtonResolver,
    pressed: PressedKeySet,
}

impl PushInputBridge {
    pub fn new(mapping: Arc<KeyMapping>, joypad: Joypad, boundary: Arc<dyn Boundary>) -> Self {
        Self {
            resolver: ButtonResolver::new(mapping, joypad, boundary),
            pressed: PressedKeySet::new(),
        }
    }
}

impl InputBridge for PushInputBridge {
    fn observe_key(&self, key: &str, pressed: bool) {
        self.pressed.observe(key, pressed);
        self.resolver.resolve(key, pressed);
    }

    fn answer_query(&self, button: LogicalButton) -> bool {
        self.pressed.query(self.resolver.mapping().key(button))
    }

    fn strategy(&self) -> InputStrategy {
        InputStrategy::Push
    }

    fn pressed_keys(&self) -> &PressedKeySet {
        &self.pressed
    }
}

/// Answers backend-initiated input requests
pub struct PollingInputBridge {
    mapping: Arc<KeyMapping>,
    pressed: PressedKeySet,
    boundary: Arc<dyn Boundary>,
}

impl PollingInputBridge {
    /// Create the bridge and subscribe to `REQUEST_INPUT_<B>` for every button
    pub fn attach(mapping: Arc<KeyMapping>, boundary: Arc<dyn Boundary>) -> Arc<Self> {
        let bridge = Arc::new(Self {
            mapping,
            pressed: PressedKeySet::new(),
            boundary: Arc::clone(&boundary),
        });

        for button in LogicalButton::ALL {
            let weak: Weak<Self> = Arc::downgrade(&bridge);
            boundary.subscribe(
                Topic::RequestInput(button),
                Arc::new(move |_event| {
                    if let Some(bridge) = weak.upgrade() {
                        bridge.reply(button);
                    }
                }),
            );
        }

        bridge
    }

    fn reply(&self, button: LogicalButton) {
        let pressed = self.answer_query(button);
        tracing::trace!(%button, pressed, "answering input request");
        self.boundary
            .emit(BoundaryEvent::ReceiveInput { button, pressed });
    }
}

impl InputBridge for PollingInputBridge {
    fn observe_key(&self, key: &str, pressed: bool) {
        self.pressed.observe(key, pressed);
    }

    fn answer_query(&self, button: LogicalButton) -> bool {
        self.pressed.query(self.mapping.key(button))
    }

    fn strategy(&self) -> InputStrategy {
        InputStrategy::Poll
    }

    fn pressed_keys(&self) -> &PressedKeySet {
        &self.pressed
    }
}

/// Build the configured strategy and wire it to the boundary
pub fn attach_input_bridge(
    strategy: InputStrategy,
    mapping: Arc<KeyMapping>,
    joypad: Joypad,
    boundary: Arc<dyn Boundary>,
) -> Arc<dyn InputBridge> {
    tracing::info!(?strategy, %joypad, "input bridge attached");
    match strategy {
        InputStrategy::Push => Arc::new(PushInputBridge::new(mapping, joypad, boundary)),
        InputStrategy::Poll => PollingInputBridge::attach(mapping, boundary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use rb_core::EventBus;

    fn record(bus: &EventBus, topic: Topic) -> Arc<Mutex<Vec<BoundaryEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(topic, Arc::new(move |event| sink.lock().push(event.clone())));
        seen
    }

    fn polling(bus: &EventBus) -> Arc<dyn InputBridge> {
        attach_input_bridge(
            InputStrategy::Poll,
            Arc::new(KeyMapping::default()),
            Joypad::Primary,
            Arc::new(bus.clone()),
        )
    }

    #[test]
    fn test_polling_answers_false_before_any_key() {
        let bus = EventBus::new();
        let _bridge = polling(&bus);
        let replies = record(&bus, Topic::ReceiveInput(LogicalButton::Start));

        bus.emit(BoundaryEvent::RequestInput(LogicalButton::Start));
        bus.run_until_idle();

        assert_eq!(
            *replies.lock(),
            vec![BoundaryEvent::ReceiveInput {
                button: LogicalButton::Start,
                pressed: false,
            }]
        );
    }

    #[test]
    fn test_polling_follows_key_state() {
        let bus = EventBus::new();
        let bridge = polling(&bus);
        let replies = record(&bus, Topic::ReceiveInput(LogicalButton::Up));

        bridge.observe_key("w", true);
        bus.emit(BoundaryEvent::RequestInput(LogicalButton::Up));
        bus.run_until_idle();

        bridge.observe_key("w", false);
        bus.emit(BoundaryEvent::RequestInput(LogicalButton::Up));
        bus.run_until_idle();

        let answers: Vec<bool> = replies
            .lock()
            .iter()
            .map(|event| match event {
                BoundaryEvent::ReceiveInput { pressed, .. } => *pressed,
                _ => panic!("Expected ReceiveInput"),
            })
            .collect();
        assert_eq!(answers, vec![true, false]);
    }

    #[test]
    fn test_polling_sends_no_commands() {
        let bus = EventBus::new();
        let bridge = polling(&bus);
        let commands = record(&bus, Topic::SetButton);

        bridge.observe_key("j", true);
        bus.run_until_idle();
        assert!(commands.lock().is_empty());
        assert!(bridge.answer_query(LogicalButton::A));
        assert_eq!(bridge.strategy(), InputStrategy::Poll);
    }

    #[test]
    fn test_polling_subscribes_every_button() {
        let bus = EventBus::new();
        let _bridge = polling(&bus);
        for button in LogicalButton::ALL {
            assert_eq!(bus.handler_count(Topic::RequestInput(button)), 1);
        }
    }

    #[test]
    fn test_dropped_bridge_stops_answering() {
        let bus = EventBus::new();
        let replies = record(&bus, Topic::ReceiveInput(LogicalButton::B));
        drop(polling(&bus));

        bus.emit(BoundaryEvent::RequestInput(LogicalButton::B));
        bus.run_until_idle();
        assert!(replies.lock().is_empty());
    }

    #[test]
    fn test_push_emits_and_tracks() {
        let bus = EventBus::new();
        let commands = record(&bus, Topic::SetButton);
        let bridge = attach_input_bridge(
            InputStrategy::Push,
            Arc::new(KeyMapping::default()),
            Joypad::Secondary,
            Arc::new(bus.clone()),
        );

        bridge.observe_key("d", true);
        assert!(bridge.answer_query(LogicalButton::Right));
        bridge.observe_key("Control", true);
        bridge.observe_key("d", false);
        bus.run_until_idle();

        assert_eq!(
            *commands.lock(),
            vec![
                BoundaryEvent::SetButton {
                    joypad: Joypad::Secondary,
                    button: LogicalButton::Right,
                    pressed: true,
                },
                BoundaryEvent::SetButton {
                    joypad: Joypad::Secondary,
                    button: LogicalButton::Right,
                    pressed: false,
                },
            ]
        );
        // Unmapped keys are still tracked
        assert!(bridge.pressed_keys().query("Control"));
        assert_eq!(bridge.strategy(), InputStrategy::Push);
    }
}
