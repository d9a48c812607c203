//! Input normalization
//!
//! Maps toolkit keysyms and pointer buttons onto the small alphabet the
//! playback controller understands: printable ASCII plus a handful of named
//! navigation keys.

use std::collections::HashMap;
use std::fmt;

use crate::surface::Modifiers;
use crate::surface::keysyms::*;

/// Primary pointer button
const BUTTON_PRIMARY: u8 = 1;

/// Normalized input code forwarded to the playback controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCode {
    /// ASCII character, 1..=127
    Char(u8),
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    Backspace,
}

impl InputCode {
    /// The character carried by this code, if it is one
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(char::from(*c)),
            _ => None,
        }
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{:?}", char::from(*c)),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Immutable keysym table, built once at startup
#[derive(Debug, Clone)]
pub struct KeyMap {
    named: HashMap<u32, InputCode>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap {
    pub fn new() -> Self {
        let named = HashMap::from([
            (XK_PAGE_UP, InputCode::PageUp),
            (XK_PAGE_DOWN, InputCode::PageDown),
            (XK_LEFT, InputCode::Left),
            (XK_RIGHT, InputCode::Right),
            (XK_UP, InputCode::Up),
            (XK_DOWN, InputCode::Down),
            (XK_BACKSPACE, InputCode::Backspace),
            (XK_KP_ADD, InputCode::Char(b'+')),
            (XK_KP_SUBTRACT, InputCode::Char(b'-')),
        ]);
        Self { named }
    }

    /// Normalize a key press. `None` means the key is not for the player.
    pub fn normalize_key(&self, keysym: u32) -> Option<InputCode> {
        if (1..=127).contains(&keysym) {
            // Range check above makes the narrowing lossless
            return Some(InputCode::Char(keysym as u8));
        }
        self.named.get(&keysym).copied()
    }
}

/// Normalize a button press: a plain primary click toggles pause (space).
pub fn normalize_button(button: u8, modifiers: Modifiers) -> Option<InputCode> {
    if button == BUTTON_PRIMARY && modifiers.is_empty() {
        Some(InputCode::Char(b' '))
    } else {
        None
    }
}
