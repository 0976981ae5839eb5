//! Host key identifiers
//!
//! Key mappings name keys the way the browser's `KeyboardEvent.key` does:
//! lowercase letters, bare digits and punctuation, `" "` for space, and
//! names such as `ArrowUp` or `Enter` for everything else.

use eframe::egui;

/// Identifier used by key mappings for `key`
pub fn key_identifier(key: egui::Key) -> String {
    use egui::Key;

    let id = match key {
        Key::ArrowUp => "ArrowUp",
        Key::ArrowDown => "ArrowDown",
        Key::ArrowLeft => "ArrowLeft",
        Key::ArrowRight => "ArrowRight",
        Key::Space => " ",
        Key::Enter => "Enter",
        Key::Escape => "Escape",
        Key::Tab => "Tab",
        Key::Backspace => "Backspace",
        Key::Insert => "Insert",
        Key::Delete => "Delete",
        Key::Home => "Home",
        Key::End => "End",
        Key::PageUp => "PageUp",
        Key::PageDown => "PageDown",
        Key::Comma => ",",
        Key::Period => ".",
        Key::Minus => "-",
        Key::Plus => "+",
        Key::Equals => "=",
        Key::Semicolon => ";",
        Key::Colon => ":",
        Key::Slash => "/",
        Key::Backslash => "\\",
        Key::Pipe => "|",
        Key::Questionmark => "?",
        Key::OpenBracket => "[",
        Key::CloseBracket => "]",
        Key::Backtick => "`",
        // Letters, digits and function keys
        _ => {
            let name = key.name();
            return if name.chars().count() == 1 {
                name.to_lowercase()
            } else {
                name.to_string()
            };
        }
    };
    id.to_string()
}

/// Key transitions in this frame's input, in the order egui observed them
pub fn key_events(input: &egui::InputState) -> Vec<(String, bool)> {
    input
        .events
        .iter()
        .filter_map(|event| match event {
            egui::Event::Key { key, pressed, .. } => Some((key_identifier(*key), *pressed)),
            _ => None,
        })
        .collect()
}
