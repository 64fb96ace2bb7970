//! Keyboard input abstraction
//!
//! Keys are addressed by scan code on the scripting side. A scan code is the
//! `u8` discriminant of [`Key`]; codes with no key are simply never pressed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Platform-independent key codes
///
/// Platform backends map their native key codes to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Key {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Numbers
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Navigation
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,

    // Editing
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,

    // Modifiers
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    SuperLeft,
    SuperRight,

    // Special
    Escape,
    Space,
    CapsLock,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
    NumpadEnter,
    NumpadDecimal,

    // Punctuation
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Backslash,
    Semicolon,
    Quote,
    Comma,
    Period,
    Slash,
    Grave,
}

impl Key {
    /// Every key, in scan code order
    pub const ALL: [Key; 99] = [
        Key::A, Key::B, Key::C, Key::D, Key::E, Key::F,
        Key::G, Key::H, Key::I, Key::J, Key::K, Key::L,
        Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
        Key::S, Key::T, Key::U, Key::V, Key::W, Key::X,
        Key::Y, Key::Z, Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3,
        Key::Digit4, Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
        Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
        Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
        Key::Up, Key::Down, Key::Left, Key::Right, Key::Home, Key::End,
        Key::PageUp, Key::PageDown, Key::Backspace, Key::Delete, Key::Insert, Key::Enter,
        Key::Tab, Key::ShiftLeft, Key::ShiftRight, Key::ControlLeft, Key::ControlRight, Key::AltLeft,
        Key::AltRight, Key::SuperLeft, Key::SuperRight, Key::Escape, Key::Space, Key::CapsLock,
        Key::Numpad0, Key::Numpad1, Key::Numpad2, Key::Numpad3, Key::Numpad4, Key::Numpad5,
        Key::Numpad6, Key::Numpad7, Key::Numpad8, Key::Numpad9, Key::NumpadAdd, Key::NumpadSubtract,
        Key::NumpadMultiply, Key::NumpadDivide, Key::NumpadEnter, Key::NumpadDecimal, Key::Minus, Key::Equal,
        Key::BracketLeft, Key::BracketRight, Key::Backslash, Key::Semicolon, Key::Quote, Key::Comma,
        Key::Period, Key::Slash, Key::Grave,
    ];

    /// Scan code of this key
    pub fn code(self) -> i32 {
        self as u8 as i32
    }

    /// Look up a key by scan code
    pub fn from_code(code: i32) -> Option<Key> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

/// Keyboard state tracker
///
/// Tracks the state of all keys and provides convenient query methods.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    /// Set of currently pressed keys
    pressed: HashSet<Key>,
    /// Keys that were just pressed this frame
    just_pressed: HashSet<Key>,
    /// Keys that were just released this frame
    just_released: HashSet<Key>,
}

impl KeyboardState {
    /// Create a new keyboard state with no keys pressed
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the keyboard state for a new frame
    ///
    /// Clears the "just_pressed" and "just_released" sets.
    pub fn update(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }

    /// Record a key press event
    pub fn press(&mut self, key: Key) {
        if !self.pressed.contains(&key) {
            self.just_pressed.insert(key);
        }
        self.pressed.insert(key);
    }

    /// Record a key release event
    pub fn release(&mut self, key: Key) {
        if self.pressed.contains(&key) {
            self.just_released.insert(key);
        }
        self.pressed.remove(&key);
    }

    /// Check if a key is currently pressed
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Check if a key was just pressed this frame
    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Check if a key was just released this frame
    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    /// Forget everything about one key, as if it was never touched
    pub fn clear_key(&mut self, key: Key) {
        self.pressed.remove(&key);
        self.just_pressed.remove(&key);
        self.just_released.remove(&key);
    }

    /// Get the number of currently pressed keys
    pub fn pressed_count(&self) -> usize {
        self.pressed.len()
    }

    /// Check if any key is currently pressed
    pub fn any_pressed(&self) -> bool {
        !self.pressed.is_empty()
    }

    /// Clear all key states
    pub fn clear(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_codes_match_discriminants() {
        for (index, key) in Key::ALL.iter().enumerate() {
            assert_eq!(key.code(), index as i32);
            assert_eq!(Key::from_code(index as i32), Some(*key));
        }
        assert_eq!(Key::from_code(-1), None);
        assert_eq!(Key::from_code(99), None);
    }

    #[test]
    fn test_keyboard_state() {
        let mut kb = KeyboardState::new();
        assert!(!kb.any_pressed());

        kb.press(Key::W);
        kb.press(Key::ShiftLeft);

        assert!(kb.is_pressed(Key::W));
        assert!(kb.is_just_pressed(Key::W));
        assert_eq!(kb.pressed_count(), 2);

        kb.update();
        assert!(kb.is_pressed(Key::W));
        assert!(!kb.is_just_pressed(Key::W));

        kb.release(Key::W);
        assert!(!kb.is_pressed(Key::W));
        assert!(kb.is_just_released(Key::W));
    }

    #[test]
    fn test_clear_key_forgets_single_key() {
        let mut kb = KeyboardState::new();
        kb.press(Key::Space);
        kb.press(Key::Enter);

        kb.clear_key(Key::Space);
        assert!(!kb.is_pressed(Key::Space));
        assert!(!kb.is_just_pressed(Key::Space));
        assert!(kb.is_pressed(Key::Enter));
    }
}
