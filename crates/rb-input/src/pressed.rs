//! Pressed key tracking
//!
//! Records the latest observed state of every host key. Entries are created
//! on first observation and never removed; a key that was never observed
//! reads as not pressed.

use parking_lot::Mutex;
use std::collections::HashMap;

/// Observed state of one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyState {
    #[default]
    Unobserved,
    Held,
    Released,
}

impl KeyState {
    pub fn is_held(self) -> bool {
        self == KeyState::Held
    }
}

/// Process-wide table of held keys
#[derive(Debug, Default)]
pub struct PressedKeySet {
    keys: Mutex<HashMap<String, bool>>,
}

impl PressedKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key-down (`pressed = true`) or key-up observation
    pub fn observe(&self, key: &str, pressed: bool) {
        let mut keys = self.keys.lock();
        match keys.get_mut(key) {
            Some(held) => *held = pressed,
            None => {
                keys.insert(key.to_owned(), pressed);
            }
        }
    }

    /// Whether `key` is currently held
    pub fn query(&self, key: &str) -> bool {
        self.keys.lock().get(key).copied().unwrap_or(false)
    }

    /// Full state of `key`
    pub fn state(&self, key: &str) -> KeyState {
        match self.keys.lock().get(key) {
            None => KeyState::Unobserved,
            Some(true) => KeyState::Held,
            Some(false) => KeyState::Released,
        }
    }

    /// Number of keys observed so far
    pub fn observed(&self) -> usize {
        self.keys.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unobserved_is_not_pressed() {
        let set = PressedKeySet::new();
        assert!(!set.query("w"));
        assert_eq!(set.state("w"), KeyState::Unobserved);
        assert_eq!(set.observed(), 0);
    }

    #[test]
    fn test_state_transitions() {
        let set = PressedKeySet::new();

        set.observe("w", true);
        assert_eq!(set.state("w"), KeyState::Held);
        assert!(set.query("w"));

        set.observe("w", false);
        assert_eq!(set.state("w"), KeyState::Released);
        assert!(!set.query("w"));

        // Entry stays after release
        assert_eq!(set.observed(), 1);
    }

    #[test]
    fn test_repeats_are_harmless() {
        let set = PressedKeySet::new();
        set.observe("k", true);
        set.observe("k", true);
        assert!(set.query("k"));

        set.observe("k", false);
        set.observe("k", false);
        assert!(!set.query("k"));

        // Key-up with no prior key-down
        set.observe("x", false);
        assert_eq!(set.state("x"), KeyState::Released);
    }

    #[test]
    fn test_keys_are_independent() {
        let set = PressedKeySet::new();
        set.observe("a", true);
        set.observe("d", true);
        set.observe("a", false);
        assert!(!set.query("a"));
        assert!(set.query("d"));
        assert!(!KeyState::Released.is_held());
    }
}
