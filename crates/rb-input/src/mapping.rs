//! Key mapping
//!
//! Static, validated table between logical buttons and host key
//! identifiers. The inverse (key -> button) is built once at construction.

use rb_core::config::KeyboardMapping;
use rb_core::{KeyMappingError, LogicalButton};
use std::collections::HashMap;

/// Total, injective LogicalButton <-> key table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapping {
    /// Key for each button, indexed by `LogicalButton::index`
    keys: [String; LogicalButton::COUNT],
    /// Reverse lookup
    buttons: HashMap<String, LogicalButton>,
}

impl KeyMapping {
    /// Build a mapping from (button, key) pairs.
    ///
    /// Every button must appear exactly once and no key may be shared.
    pub fn from_pairs<I, K>(pairs: I) -> Result<Self, KeyMappingError>
    where
        I: IntoIterator<Item = (LogicalButton, K)>,
        K: Into<String>,
    {
        let mut keys: [Option<String>; LogicalButton::COUNT] = Default::default();
        let mut buttons = HashMap::with_capacity(LogicalButton::COUNT);

        for (button, key) in pairs {
            let key = key.into();
            if key.is_empty() {
                return Err(KeyMappingError::EmptyKey(button));
            }
            if keys[button.index()].is_some() {
                return Err(KeyMappingError::DuplicateButton(button));
            }
            if let Some(&first) = buttons.get(&key) {
                return Err(KeyMappingError::DuplicateKey {
                    key,
                    first,
                    second: button,
                });
            }
            buttons.insert(key.clone(), button);
            keys[button.index()] = Some(key);
        }

        let mut resolved: [String; LogicalButton::COUNT] = Default::default();
        for button in LogicalButton::ALL {
            resolved[button.index()] = keys[button.index()]
                .take()
                .ok_or(KeyMappingError::MissingButton(button))?;
        }

        Ok(Self {
            keys: resolved,
            buttons,
        })
    }

    /// Build a mapping from the keyboard section of the configuration
    pub fn from_config(config: &KeyboardMapping) -> Result<Self, KeyMappingError> {
        Self::from_pairs(config.bindings())
    }

    /// Key bound to `button`
    pub fn key(&self, button: LogicalButton) -> &str {
        &self.keys[button.index()]
    }

    /// Button bound to `key`, if any
    pub fn button(&self, key: &str) -> Option<LogicalButton> {
        self.buttons.get(key).copied()
    }

    /// (button, key) pairs in button order
    pub fn iter(&self) -> impl Iterator<Item = (LogicalButton, &str)> + '_ {
        LogicalButton::ALL
            .into_iter()
            .map(move |button| (button, self.key(button)))
    }
}

impl Default for KeyMapping {
    /// w/a/s/d for the d-pad, j/k for A/B, 1/2 for Start/Select
    fn default() -> Self {
        Self::from_config(&KeyboardMapping::default())
            .unwrap_or_else(|err| unreachable!("default keyboard mapping is valid: {err}"))
    }
}
